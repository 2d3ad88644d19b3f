//! Stamp a signature image onto an insurance form.
//!
//! Usage:
//!   pdf_seal <input.pdf> <signature.png|jpg> [--width N] [--offset-x N] [--offset-y N]
//!            [--output PATH] [--config FILE.json] [--verbose]
//!
//! The signed copy is written next to the input as `<stem>_추가서명.pdf`
//! unless `--output` is given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdf_seal::{output_file_name, SignConfig, SignRequest, Signer, SigningParameters};

struct CliArgs {
    input: PathBuf,
    signature: PathBuf,
    width: String,
    offset_x: String,
    offset_y: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
}

impl CliArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut positional = Vec::new();
        let mut width = String::new();
        let mut offset_x = String::new();
        let mut offset_y = String::new();
        let mut output = None;
        let mut config = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--width" => width = take_value(&args, &mut i)?,
                "--offset-x" => offset_x = take_value(&args, &mut i)?,
                "--offset-y" => offset_y = take_value(&args, &mut i)?,
                "--output" | "-o" => output = Some(PathBuf::from(take_value(&args, &mut i)?)),
                "--config" => config = Some(PathBuf::from(take_value(&args, &mut i)?)),
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => return Err(usage()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
                other => positional.push(PathBuf::from(other)),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        let (Some(input), Some(signature), None) =
            (positional.next(), positional.next(), positional.next())
        else {
            return Err(usage());
        };

        Ok(Self {
            input,
            signature,
            width,
            offset_x,
            offset_y,
            output,
            config,
            verbose,
        })
    }

    fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let name = output_file_name(&self.input.to_string_lossy());
        self.input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(name)
    }
}

/// Value following the option at `*i`; advances `*i` past it.
fn take_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let name = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} needs a value", name))
}

fn usage() -> String {
    "usage: pdf_seal <input.pdf> <signature.png|jpg> [--width N] [--offset-x N] [--offset-y N] \
     [--output PATH] [--config FILE.json] [--verbose]"
        .to_string()
}

fn run(args: &CliArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => SignConfig::from_json_file(path)?,
        None => SignConfig::default(),
    };

    let pdf = std::fs::read(&args.input)?;
    let image = std::fs::read(&args.signature)?;
    let params = SigningParameters::from_inputs(&args.width, &args.offset_x, &args.offset_y);

    let request = SignRequest::new(&pdf, &image).with_params(params);
    let outcome = Signer::new(config).sign(&request)?;

    let output = args.output_path();
    std::fs::write(&output, &outcome.pdf)?;
    log::info!("Wrote {}", output.display());

    Ok(format!("{}\n{}", outcome.status_message(), output.display()))
}

fn main() -> ExitCode {
    let args = match CliArgs::from_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        },
    };

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("실패: {}", e);
            ExitCode::FAILURE
        },
    }
}
