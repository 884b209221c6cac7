//! Non-interactive batch mode: obfuscate commands, print results on
//! stdout, diagnostics on stderr, exit.

use std::io::{self, BufRead, IsTerminal, Write};

use cf_engine::ObfuscateResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audit::{errors_json, AuditLogger, RunInfo};
use crate::cli::Options;
use crate::config::Config;
use crate::loader::template_command;
use crate::session::Session;
use crate::style::{self, Style};

/// Stderr formatting for batch mode. TTY output is colored and fitted to
/// the terminal width; anything else is plain text, one line per event.
pub struct BatchOutput<W: Write> {
    writer: W,
    style: Style,
    term_width: u16,
}

impl<W: Write> BatchOutput<W> {
    pub fn new(writer: W, is_tty: bool) -> Self {
        let term_width = if is_tty {
            crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80)
        } else {
            80
        };
        Self {
            writer,
            style: Style::for_stream(is_tty),
            term_width,
        }
    }

    fn prefix(&self) -> String {
        format!(
            "{}{}[cf:batch]{}",
            self.style.dim_start(),
            self.style.cyan_start(),
            self.style.reset()
        )
    }

    /// Which profile variant a run uses, and the seed that reproduces it.
    pub fn emit_start(&mut self, executable: &str, platform: &str, version: &str, seed: u64) {
        let platform = if platform.is_empty() { "any" } else { platform };
        let line = format!("{executable} ({platform} {version}) seed {seed}");
        let line = style::truncate_to_width(&line, self.term_width.saturating_sub(11) as usize);
        let _ = writeln!(self.writer, "{} {line}", self.prefix());
    }

    pub fn emit_warning(&mut self, msg: &str) {
        let _ = writeln!(
            self.writer,
            "{} {}warning: {msg}{}",
            self.prefix(),
            self.style.yellow_start(),
            self.style.reset()
        );
    }

    pub fn emit_error(&mut self, msg: &str) {
        let _ = writeln!(
            self.writer,
            "{} {}error: {msg}{}",
            self.prefix(),
            self.style.red_start(),
            self.style.reset()
        );
    }

    /// Per-modifier failures and skips from one run.
    pub fn emit_result_notes(&mut self, result: &ObfuscateResult) {
        for (name, err) in &result.errors {
            self.emit_warning(&format!("{name}: {err}"));
        }
        if !result.skipped.is_empty() {
            let _ = writeln!(
                self.writer,
                "{} {}skipped: {}{}",
                self.prefix(),
                self.style.dim_start(),
                result.skipped.join(", "),
                self.style.reset()
            );
        }
    }
}

/// One batch invocation.
pub struct BatchRequest {
    pub executable: String,
    /// Commands to obfuscate. Empty means the profile's template command.
    pub commands: Vec<String>,
    pub count: usize,
    pub seed: u64,
    pub json: bool,
}

/// Obfuscate every request command `count` times. Returns the exit code:
/// 0 when every command produced output, 1 otherwise.
pub fn execute<W: Write, E: Write>(
    session: &Session,
    request: &BatchRequest,
    audit: &mut AuditLogger,
    out: &mut W,
    diag: &mut BatchOutput<E>,
) -> i32 {
    let (file, variant) = match session.resolve(&request.executable) {
        Ok(found) => found,
        Err(e) => {
            diag.emit_error(&e.to_string());
            return 1;
        }
    };
    for name in session.unknown_modifiers() {
        diag.emit_warning(&format!("unknown modifier {name:?}"));
    }

    let enabled = session.enabled_for(variant);
    let run = RunInfo {
        executable: &file.name,
        platform: &variant.platform,
        seed: request.seed,
    };
    diag.emit_start(&file.name, &variant.platform, &variant.executable_version, request.seed);

    let commands = if request.commands.is_empty() {
        vec![template_command(variant)]
    } else {
        request.commands.clone()
    };

    let mut rng = StdRng::seed_from_u64(request.seed);
    let mut code = 0;
    for input in &commands {
        for _ in 0..request.count {
            match session
                .obfuscator
                .obfuscate_variant(input, variant, &enabled, &mut rng)
            {
                Ok(result) => {
                    diag.emit_result_notes(&result);
                    audit.log_obfuscated(&run, input, &result);
                    let line = if request.json {
                        serde_json::json!({
                            "executable": file.name,
                            "platform": variant.platform,
                            "seed": request.seed,
                            "input": input,
                            "output": result.output,
                            "applied": result.applied,
                            "skipped": result.skipped,
                            "errors": errors_json(&result),
                        })
                        .to_string()
                    } else {
                        result.output
                    };
                    if writeln!(out, "{line}").is_err() {
                        return 1;
                    }
                }
                Err(e) => {
                    diag.emit_error(&format!("{input:?}: {e}"));
                    audit.log_failed(&run, input, &e.to_string());
                    code = 1;
                    break;
                }
            }
        }
    }
    let _ = out.flush();
    code
}

/// Entry point for `cmdfuscator <exe> [command]`. Without a command, piped
/// stdin supplies one command per line.
pub fn run_batch(config: &Config, options: &Options, executable: &str, command: Option<String>) -> i32 {
    let stderr = io::stderr();
    let mut diag = BatchOutput::new(stderr.lock(), stderr.is_terminal());

    let session = match Session::open(config, options) {
        Ok(s) => s,
        Err(e) => {
            diag.emit_error(&e.to_string());
            return 1;
        }
    };

    let commands = match command {
        Some(c) => vec![c],
        None if !io::stdin().is_terminal() => match read_commands(io::stdin().lock()) {
            Ok(commands) => commands,
            Err(e) => {
                diag.emit_error(&format!("reading stdin: {e}"));
                return 1;
            }
        },
        None => Vec::new(),
    };

    let request = BatchRequest {
        executable: executable.to_string(),
        commands,
        count: options.count.unwrap_or(config.output.count).max(1),
        seed: options.seed.unwrap_or_else(|| rand::rng().random()),
        json: options.json || config.output.json,
    };

    let mut audit = AuditLogger::open_or_noop(config.audit.enabled, &config.audit.resolve_path(), "batch");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&session, &request, &mut audit, &mut out, &mut diag)
}

/// Non-blank lines of `reader`, trimmed. A line that is not valid UTF-8
/// fails the whole read.
pub fn read_commands<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut commands = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            commands.push(line.to_string());
        }
    }
    Ok(commands)
}
