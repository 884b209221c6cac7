use std::io::{self, IsTerminal};

use cf_core::batch::run_batch;
use cf_core::cli::{parse_args, print_help, Mode};
use cf_core::config::Config;
use cf_core::listing::{format_modifiers, format_profiles};
use cf_core::repl::run_repl;
use cf_core::session::Session;
use cf_core::style::Style;

fn main() {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("[cf] error: {e}");
            eprintln!("hint: cmdfuscator --help");
            std::process::exit(2);
        }
    };

    let config = Config::load_or_default();
    let options = cli.options;

    let code = match cli.mode {
        Mode::Help => {
            print_help();
            0
        }
        Mode::Version => {
            println!("cmdfuscator {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Mode::List(platform) => match Session::open(&config, &options) {
            Ok(session) => {
                let style = Style::for_stream(io::stdout().is_terminal());
                match format_profiles(&session.profiles, platform.as_deref(), &style) {
                    Some(text) => {
                        print!("{text}");
                        0
                    }
                    None => {
                        eprintln!(
                            "[cf:load] error: no profiles for platform {:?}",
                            platform.unwrap_or_default()
                        );
                        1
                    }
                }
            }
            Err(e) => {
                eprintln!("[cf:load] error: {e}");
                1
            }
        },
        Mode::Modifiers(executable) => {
            let shown = Session::open(&config, &options).and_then(|session| {
                let (_, variant) = session.resolve(&executable)?;
                let summaries = session.obfuscator.summary(&session.enabled_for(variant));
                let style = Style::for_stream(io::stdout().is_terminal());
                Ok(format_modifiers(&summaries, variant, &style))
            });
            match shown {
                Ok(text) => {
                    print!("{text}");
                    0
                }
                Err(e) => {
                    eprintln!("[cf:load] error: {e}");
                    1
                }
            }
        }
        Mode::Batch {
            executable,
            command,
        } => run_batch(&config, &options, &executable, command),
        Mode::Repl => {
            if io::stdin().is_terminal() {
                run_repl(&config, &options)
            } else {
                eprintln!("[cf] error: no executable given and stdin is not a terminal");
                eprintln!("hint: cmdfuscator <exe> [command], or --help");
                2
            }
        }
    };

    std::process::exit(code);
}
