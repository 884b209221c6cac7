//! Interactive line mode: pick an executable, then every line typed is
//! obfuscated with its profile. `:`-prefixed lines are commands.

use std::io::{self, BufRead, Write};

use cf_engine::EnabledMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audit::{AuditLogger, RunInfo};
use crate::cli::Options;
use crate::clipboard::copy_to_clipboard;
use crate::config::Config;
use crate::listing::{format_modifiers, format_profiles};
use crate::loader::template_command;
use crate::session::{canonical_name, Session};
use crate::style::{invisible_count, Style};

const HELP: &str = "\
:use EXE          select the executable profile
:list [PLATFORM]  list profiles
:mods             show modifiers for the current profile
:toggle NAME      switch a modifier on or off
:template         show the profile's example command
:copy             copy the last result to the clipboard (OSC 52)
:help             this help
:quit             leave
anything else is obfuscated with the current profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Use(String),
    List(Option<String>),
    Mods,
    Toggle(String),
    Template,
    Copy,
    Help,
    Quit,
    Obfuscate(String),
    Empty,
    MissingArgument(&'static str),
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return ReplCommand::Obfuscate(line.to_string());
        };
        let (cmd, arg) = match rest.split_once(char::is_whitespace) {
            Some((c, a)) => (c, Some(a.trim().to_string()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        match cmd {
            "use" | "u" => arg.map_or(ReplCommand::MissingArgument(":use"), ReplCommand::Use),
            "list" | "l" => ReplCommand::List(arg),
            "mods" | "m" => ReplCommand::Mods,
            "toggle" | "t" => arg.map_or(ReplCommand::MissingArgument(":toggle"), ReplCommand::Toggle),
            "template" => ReplCommand::Template,
            "copy" | "c" => ReplCommand::Copy,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "q" | "exit" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd.to_string()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

struct Current {
    executable: String,
    enabled: EnabledMap,
}

pub struct Repl<'s> {
    session: &'s Session,
    style: Style,
    current: Option<Current>,
    rng: StdRng,
    seed: u64,
    audit: AuditLogger,
    last_output: Option<String>,
}

impl<'s> Repl<'s> {
    pub fn new(session: &'s Session, style: Style, seed: u64, audit: AuditLogger) -> Self {
        Self {
            session,
            style,
            current: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            audit,
            last_output: None,
        }
    }

    pub fn prompt(&self) -> String {
        match &self.current {
            Some(cur) => format!("{}cf {}>{} ", self.style.cyan_start(), cur.executable, self.style.reset()),
            None => format!("{}cf>{} ", self.style.cyan_start(), self.style.reset()),
        }
    }

    /// Read lines until `:quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "cmdfuscator {} {}(seed {}, :help for commands){}",
            env!("CARGO_PKG_VERSION"),
            self.style.dim_start(),
            self.seed,
            self.style.reset()
        )?;
        let mut line = String::new();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            if self.handle(ReplCommand::parse(&line), out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub fn handle<W: Write>(&mut self, cmd: ReplCommand, out: &mut W) -> io::Result<Flow> {
        match cmd {
            ReplCommand::Empty => {}
            ReplCommand::Quit => return Ok(Flow::Quit),
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Use(exe) => self.select(&exe, out)?,
            ReplCommand::List(platform) => {
                match format_profiles(&self.session.profiles, platform.as_deref(), &self.style) {
                    Some(text) => write!(out, "{text}")?,
                    None => self.warn(out, &format!("no profiles for platform {:?}", platform.unwrap_or_default()))?,
                }
            }
            ReplCommand::Mods => {
                if let Some(cur) = self.require_current(out)? {
                    let (_, variant) = self.session.resolve(&cur.executable).map_err(io::Error::other)?;
                    let summaries = self.session.obfuscator.summary(&cur.enabled);
                    write!(out, "{}", format_modifiers(&summaries, variant, &self.style))?;
                }
            }
            ReplCommand::Toggle(name) => self.toggle(&name, out)?,
            ReplCommand::Template => {
                if let Some(cur) = self.require_current(out)? {
                    let (_, variant) = self.session.resolve(&cur.executable).map_err(io::Error::other)?;
                    writeln!(out, "{}", template_command(variant))?;
                }
            }
            ReplCommand::Copy => match &self.last_output {
                Some(text) => {
                    copy_to_clipboard(out, text)?;
                    writeln!(out, "{}copied{}", self.style.dim_start(), self.style.reset())?;
                }
                None => self.warn(out, "nothing to copy yet")?,
            },
            ReplCommand::Obfuscate(command) => self.obfuscate(&command, out)?,
            ReplCommand::MissingArgument(cmd) => self.warn(out, &format!("{cmd} needs an argument"))?,
            ReplCommand::Unknown(cmd) => self.warn(out, &format!("unknown command :{cmd} (try :help)"))?,
        }
        Ok(Flow::Continue)
    }

    fn warn<W: Write>(&self, out: &mut W, msg: &str) -> io::Result<()> {
        writeln!(out, "[cf:repl] {}{msg}{}", self.style.yellow_start(), self.style.reset())
    }

    fn require_current<W: Write>(&self, out: &mut W) -> io::Result<Option<&Current>> {
        if self.current.is_none() {
            self.warn(out, "no executable selected (use :use EXE)")?;
        }
        Ok(self.current.as_ref())
    }

    fn select<W: Write>(&mut self, executable: &str, out: &mut W) -> io::Result<()> {
        let (file, variant) = match self.session.resolve(executable) {
            Ok(found) => found,
            Err(e) => return self.warn(out, &e.to_string()),
        };
        let platform = if variant.platform.is_empty() { "any" } else { variant.platform.as_str() };
        writeln!(
            out,
            "using {}{}{} ({platform} {})",
            self.style.bold_start(),
            file.name,
            self.style.reset(),
            variant.executable_version
        )?;
        writeln!(out, "{}e.g. {}{}", self.style.dim_start(), template_command(variant), self.style.reset())?;
        self.current = Some(Current {
            executable: file.name.clone(),
            enabled: self.session.enabled_for(variant),
        });
        Ok(())
    }

    fn toggle<W: Write>(&mut self, name: &str, out: &mut W) -> io::Result<()> {
        let Some(canonical) = canonical_name(self.session.registry(), name) else {
            return self.warn(out, &format!("unknown modifier {name:?}"));
        };
        if self.require_current(out)?.is_none() {
            return Ok(());
        }
        let session = self.session;
        let style = self.style;
        let Some(cur) = self.current.as_mut() else {
            return Ok(());
        };
        let on = !cur.enabled.get(canonical).copied().unwrap_or(false);
        cur.enabled.insert(canonical.to_string(), on);

        let (_, variant) = session.resolve(&cur.executable).map_err(io::Error::other)?;
        let note = if variant.modifier_config(canonical).is_none() {
            " (not configured by this profile)"
        } else {
            ""
        };
        let state = if on { "on" } else { "off" };
        writeln!(out, "{canonical} {state}{}{note}{}", style.dim_start(), style.reset())
    }

    fn obfuscate<W: Write>(&mut self, command: &str, out: &mut W) -> io::Result<()> {
        let session = self.session;
        let Some(cur) = self.current.as_ref() else {
            return self.warn(out, "no executable selected (use :use EXE)");
        };
        let (file, variant) = session.resolve(&cur.executable).map_err(io::Error::other)?;
        let run = RunInfo {
            executable: &file.name,
            platform: &variant.platform,
            seed: self.seed,
        };

        match session
            .obfuscator
            .obfuscate_variant(command, variant, &cur.enabled, &mut self.rng)
        {
            Ok(result) => {
                self.audit.log_obfuscated(&run, command, &result);
                writeln!(out, "{}{}{}", self.style.green_start(), result.output, self.style.reset())?;
                let hidden = invisible_count(&result.output);
                if hidden > 0 {
                    writeln!(out, "{}(+{hidden} invisible){}", self.style.dim_start(), self.style.reset())?;
                }
                for (name, err) in &result.errors {
                    self.warn(out, &format!("{name}: {err}"))?;
                }
                self.last_output = Some(result.output);
            }
            Err(e) => {
                self.audit.log_failed(&run, command, &e.to_string());
                self.warn(out, &e.to_string())?;
            }
        }
        Ok(())
    }
}

/// Entry point for interactive mode.
pub fn run_repl(config: &Config, options: &Options) -> i32 {
    let session = match Session::open(config, options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[cf:repl] error: {e}");
            return 1;
        }
    };
    for name in session.unknown_modifiers() {
        eprintln!("[cf:repl] warning: unknown modifier {name:?}");
    }

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let audit = AuditLogger::open_or_noop(config.audit.enabled, &config.audit.resolve_path(), "repl");
    let mut repl = Repl::new(&session, Style::new(), seed, audit);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match repl.run(stdin.lock(), &mut stdout.lock()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("[cf:repl] error: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cf_engine::{Obfuscator, Registry};

    use crate::loader::ProfileSet;

    fn session() -> Session {
        Session::new(
            ProfileSet::bundled().unwrap(),
            Obfuscator::new(Arc::new(Registry::builtin())).with_platform("windows"),
            Vec::new(),
            Vec::new(),
        )
    }

    fn script(session: &Session, input: &str) -> String {
        let mut repl = Repl::new(session, Style::disabled(), 7, AuditLogger::noop());
        let mut out = Vec::new();
        repl.run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(ReplCommand::parse("  "), ReplCommand::Empty);
        assert_eq!(ReplCommand::parse(":use certutil"), ReplCommand::Use("certutil".into()));
        assert_eq!(ReplCommand::parse(":use"), ReplCommand::MissingArgument(":use"));
        assert_eq!(ReplCommand::parse(":list"), ReplCommand::List(None));
        assert_eq!(ReplCommand::parse(":list  linux "), ReplCommand::List(Some("linux".into())));
        assert_eq!(ReplCommand::parse(":t Sed"), ReplCommand::Toggle("Sed".into()));
        assert_eq!(ReplCommand::parse(":q"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse(":wat"), ReplCommand::Unknown("wat".into()));
        assert_eq!(
            ReplCommand::parse("certutil -urlcache"),
            ReplCommand::Obfuscate("certutil -urlcache".into())
        );
    }

    #[test]
    fn obfuscate_needs_a_profile() {
        let s = session();
        let out = script(&s, "certutil -f\n:quit\n");
        assert!(out.contains("no executable selected"));
    }

    #[test]
    fn use_then_obfuscate() {
        let s = session();
        let out = script(&s, ":use certutil\ncertutil -urlcache -f http://127.0.0.1/a.txt\n");
        assert!(out.contains("using certutil (windows 10.0.22621)"));
        assert!(out.contains("cf certutil> "));
        let result = out
            .lines()
            .find(|l| l.starts_with("cf certutil> ") && l.len() > "cf certutil> ".len())
            .unwrap();
        assert!(result.contains("http://"));
    }

    #[test]
    fn toggles_and_mods() {
        let s = session();
        let out = script(&s, ":use curl\n:toggle regex\n:toggle Regex\n:toggle Sed\n:mods\n");
        assert!(out.contains("Regex off"));
        assert!(out.contains("Regex on"));
        assert!(out.contains("Sed on (not configured by this profile)"));
        assert!(out.contains("UrlTransformer"));
    }

    #[test]
    fn everything_off_returns_input() {
        let s = session();
        let mut input = String::from(":use certutil\n");
        for name in s.registry().names() {
            input.push_str(&format!(":toggle {name}\n"));
        }
        input.push_str("certutil -urlcache -f x\n");
        let out = script(&s, &input);
        assert!(out.contains("cf certutil> certutil -urlcache -f x\n"));
    }

    #[test]
    fn copy_emits_osc52_after_result() {
        let s = session();
        let out = script(&s, ":copy\n:use curl\ncurl -s x\n:copy\n");
        assert!(out.contains("nothing to copy yet"));
        assert!(out.contains("\x1b]52;c;"));
        assert!(out.contains("copied"));
    }

    #[test]
    fn unknown_profile_and_command() {
        let s = session();
        let out = script(&s, ":use notepad\n:frob\n:toggle Nope\n");
        assert!(out.contains("[cf:repl] unknown executable \"notepad\""));
        assert!(out.contains("unknown command :frob"));
        assert!(out.contains("unknown modifier \"Nope\""));
    }

    #[test]
    fn template_and_list() {
        let s = session();
        let out = script(&s, ":use powershell\n:template\n:list linux\n:list plan9\n");
        assert!(out.contains("powershell -NoProfile -NonInteractive -ExecutionPolicy Bypass -File"));
        assert!(out.contains("  powershell (pwsh)"));
        assert!(out.contains("no profiles for platform \"plan9\""));
    }

    #[test]
    fn seeded_sessions_repeat() {
        let s = session();
        let input = ":use certutil\ncertutil -urlcache -split -f http://127.0.0.1/a C:\\a\\b\n";
        assert_eq!(script(&s, input), script(&s, input));
    }
}
