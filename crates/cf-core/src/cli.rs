//! Command-line parsing for `cmdfuscator`.

use std::path::PathBuf;

use thiserror::Error;

/// Options shared by every mode. Unset values fall back to the config file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Options {
    pub seed: Option<u64>,
    pub count: Option<usize>,
    pub platform: Option<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub json: bool,
    pub profiles: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Help,
    Version,
    /// `--list [platform]`
    List(Option<String>),
    /// `--modifiers <executable>`
    Modifiers(String),
    Batch {
        executable: String,
        command: Option<String>,
    },
    Repl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub mode: Mode,
    pub options: Options,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("{0} requires a value")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),
    #[error("{0} needs an executable name")]
    MissingExecutable(&'static str),
    #[error("--list and --modifiers cannot be combined")]
    Conflict,
}

pub fn parse_args<I>(args: I) -> Result<Cli, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut options = Options::default();
    let mut positionals: Vec<String> = Vec::new();
    let mut trailing: Option<String> = None;
    let mut list = false;
    let mut modifiers = false;

    while let Some(arg) = args.next() {
        // `--seed=7` is the same as `--seed 7`.
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, UsageError> {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| UsageError::MissingValue(name.to_string()))
        };

        match flag.as_str() {
            "-h" | "--help" => return Ok(Cli { mode: Mode::Help, options }),
            "-V" | "--version" => return Ok(Cli { mode: Mode::Version, options }),
            "--seed" | "-s" => options.seed = Some(parse_number(&flag, value(&flag)?)?),
            "--count" | "-n" => {
                let n: usize = parse_number(&flag, value(&flag)?)?;
                if n == 0 {
                    return Err(UsageError::InvalidValue { flag: flag.clone(), value: "0".into() });
                }
                options.count = Some(n);
            }
            "--platform" | "-p" => options.platform = Some(value(&flag)?),
            "--enable" => options.enable.push(value(&flag)?),
            "--disable" => options.disable.push(value(&flag)?),
            "--profiles" => options.profiles = Some(PathBuf::from(value(&flag)?)),
            "--json" => options.json = true,
            "--list" | "-l" => list = true,
            "--modifiers" | "-m" => modifiers = true,
            "--" => {
                let rest: Vec<String> = args.by_ref().collect();
                if !rest.is_empty() {
                    trailing = Some(rest.join(" "));
                }
                break;
            }
            s if s.starts_with('-') && s.len() > 1 => return Err(UsageError::UnknownOption(arg)),
            _ => positionals.push(arg),
        }
    }

    let mode = if list && modifiers {
        return Err(UsageError::Conflict);
    } else if list {
        let mut rest = positionals.into_iter();
        let platform = rest.next();
        if let Some(extra) = rest.next() {
            return Err(UsageError::UnexpectedArgument(extra));
        }
        Mode::List(platform)
    } else if modifiers {
        let mut rest = positionals.into_iter();
        let executable = rest.next().ok_or(UsageError::MissingExecutable("--modifiers"))?;
        if let Some(extra) = rest.next() {
            return Err(UsageError::UnexpectedArgument(extra));
        }
        Mode::Modifiers(executable)
    } else {
        let mut rest = positionals.into_iter();
        match rest.next() {
            None if trailing.is_some() => return Err(UsageError::MissingExecutable("--")),
            None => Mode::Repl,
            Some(executable) => {
                let command = match (rest.next(), trailing) {
                    (Some(c), None) => Some(c),
                    (None, t) => t,
                    (Some(_), Some(t)) => return Err(UsageError::UnexpectedArgument(t)),
                };
                if let Some(extra) = rest.next() {
                    return Err(UsageError::UnexpectedArgument(extra));
                }
                Mode::Batch { executable, command }
            }
        }
    };

    Ok(Cli { mode, options })
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: String) -> Result<T, UsageError> {
    value.trim().parse().map_err(|_| UsageError::InvalidValue {
        flag: flag.to_string(),
        value,
    })
}

pub fn print_help() {
    println!("cmdfuscator - command-line obfuscation for detection testing");
    println!();
    println!("Usage:");
    println!("  cmdfuscator                         Interactive mode");
    println!("  cmdfuscator <exe> [\"command\"]       Obfuscate a command (default: the profile template)");
    println!("  cmdfuscator <exe> -- <command...>   Obfuscate the remaining arguments as one command");
    println!("  echo \"command\" | cmdfuscator <exe>  Obfuscate each line of stdin");
    println!("  cmdfuscator --list [platform]       List profiles");
    println!("  cmdfuscator --modifiers <exe>       Show the modifiers a profile configures");
    println!();
    println!("Options:");
    println!("  -s, --seed N        Seed the random source for reproducible output");
    println!("  -n, --count N       Print N variations per command");
    println!("  -p, --platform P    Prefer profile variants for platform P");
    println!("  --enable NAME       Force a modifier on (repeatable)");
    println!("  --disable NAME      Force a modifier off (repeatable)");
    println!("  --json              One JSON object per result");
    println!("  --profiles DIR      Load profiles from DIR instead of the bundled set");
    println!("  -V, --version       Print version");
    println!("  -h, --help          Print this help");
}
