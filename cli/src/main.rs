mod highlighter;
mod lexer;

use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};

use aoxim::{
    Diagnostic, Engine, EngineOptions, Error, Value, render_diagnostic, render_error,
};
use aoxim_core::parser;
use bumpalo::Bump;
use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use nu_ansi_term::Color;
use reedline::{
    DefaultCompleter, DescriptionMode, EditCommand, Emacs, FileBackedHistory, IdeMenu, KeyCode,
    KeyModifiers, Keybindings, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, Reedline, ReedlineEvent, ReedlineMenu, Signal,
    default_emacs_keybindings,
};

use crate::highlighter::Highlighter;
use crate::lexer::InputValidator;

/// Aoxim - a small scripting language with a C FFI
#[derive(Parser, Debug)]
#[command(name = "aoxim")]
#[command(about = "Run aoxim programs", long_about = None)]
struct Args {
    /// Color REPL results by type
    #[arg(long)]
    color: bool,

    /// Print the parsed syntax tree before running (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Maximum call depth before the program is stopped
    #[arg(long, default_value_t = 1000)]
    max_depth: usize,

    /// Program to run (if not provided, starts the REPL or reads stdin)
    file: Option<PathBuf>,
}

const HISTORY_SIZE: usize = 1000;

const COMPLETIONS: &[&str] = &[
    "lambda", "while", "for", "if", "else", "return", "break", "continue", "const", "struct",
    "match", "import", "link", "extern", "nullptr", "deref", "True", "False", "print", "type",
    "help", "assert", "test", "exit", "len", "range", "tuple", "int", "double", "str", "bool",
    "char", "any", "is_error", "is_null", "ptr_to_int", "int_to_ptr", "alloc", "_store_ptr",
];

struct ReplPrompt;

impl Prompt for ReplPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(">>> ")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(&self, search: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({prefix}reverse-search: {}) ", search.term))
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> Reedline {
    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(COMPLETIONS.iter().map(|word| word.to_string()).collect());
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_min_description_width(0)
        .with_max_description_width(50)
        .with_description_offset(1)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let mut line_editor = Reedline::create()
        .with_highlighter(Box::new(Highlighter))
        .with_validator(Box::new(InputValidator))
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    if let Some(path) = dirs::home_dir().map(|home| home.join(".aoxim_history")) {
        match FileBackedHistory::with_file(HISTORY_SIZE, path) {
            Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
            Err(err) => tracing::warn!(%err, "REPL history unavailable"),
        }
    }

    line_editor
}

/// Prints diagnostics with a source snippet when stderr is a terminal.
struct Reporter {
    fancy: bool,
    main_name: String,
    main_source: String,
}

impl Reporter {
    fn new(main_name: &str, main_source: &str) -> Self {
        Self {
            fancy: atty::is(atty::Stream::Stderr),
            main_name: main_name.to_string(),
            main_source: main_source.to_string(),
        }
    }

    fn report(&self, diagnostic: &Diagnostic) {
        if !self.fancy {
            eprintln!("{diagnostic}");
            return;
        }
        let source = match diagnostic.file.as_deref() {
            None => Some(Cow::Borrowed(self.main_source.as_str())),
            Some(name) if name == self.main_name => Some(Cow::Borrowed(self.main_source.as_str())),
            Some(name) => std::fs::read_to_string(name).ok().map(Cow::Owned),
        };
        match source {
            Some(source) => render_diagnostic(diagnostic, &source, true),
            None => eprintln!("{diagnostic}"),
        }
    }
}

/// Prints the syntax tree of `source`, or its errors.
fn debug_parse(source: &str) {
    let arena = Bump::new();
    let source = arena.alloc_str(source);
    match parser::parse(&arena, source) {
        Ok(program) => {
            println!("=== Parsed AST ===");
            for item in program.items {
                println!("{:#?}", item.kind);
            }
            println!();
        }
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error.to_diagnostic());
            }
        }
    }
}

/// Exit status for an error that stopped the program.
fn stop_status(error: &Error) -> i32 {
    match error {
        Error::Exit { code } => *code,
        other => {
            render_error(other);
            1
        }
    }
}

fn paint(value: Value<'_>, color: bool) -> String {
    let text = value.repr();
    if !color {
        return text;
    }
    let color = match value.unwrap_any() {
        Value::Int(_) | Value::Double(_) => Color::Cyan,
        Value::Str(_) | Value::Char(_) => Color::Green,
        Value::Bool(_) | Value::Null => Color::Magenta,
        Value::Error(_) => Color::Red,
        Value::Pointer(_) => Color::Yellow,
        _ => Color::Default,
    };
    color.paint(text).to_string()
}

fn run_file(engine: &mut Engine<'_>, path: &Path, args: &Args) -> i32 {
    let name = path.display().to_string();
    // Unreadable files are reported by the engine
    let source = std::fs::read_to_string(path).unwrap_or_default();
    if args.debug_parse {
        debug_parse(&source);
    }

    let reporter = Reporter::new(&name, &source);
    let result = engine.run_file(path, &mut |d| reporter.report(d));
    finish(engine, result)
}

fn run_stdin(engine: &mut Engine<'_>, args: &Args) -> Result<i32> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .into_diagnostic()
        .wrap_err("Error reading program from stdin")?;
    if args.debug_parse {
        debug_parse(&source);
    }

    let reporter = Reporter::new("<stdin>", &source);
    let result = engine.run("<stdin>", &source, &mut |d| reporter.report(d));
    Ok(finish(engine, result))
}

fn finish(engine: &Engine<'_>, result: std::result::Result<Value<'_>, Error>) -> i32 {
    match result {
        Ok(_) if engine.error_count() > 0 => 1,
        Ok(_) => 0,
        Err(error) => stop_status(&error),
    }
}

fn run_repl(engine: &mut Engine<'_>, args: &Args) -> i32 {
    let mut line_editor = setup_reedline();
    let prompt = ReplPrompt;

    println!("aoxim REPL - type help() for builtins, quit or Ctrl+D to leave");

    loop {
        let sig = match line_editor.read_line(&prompt) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Reedline error: {e}");
                return 1;
            }
        };

        let buffer = match sig {
            Signal::Success(buffer) => buffer,
            Signal::CtrlD | Signal::CtrlC => return 0,
        };
        match buffer.trim() {
            "" => continue,
            "quit" | "exit" => return 0,
            _ => {}
        }
        if args.debug_parse {
            debug_parse(&buffer);
        }

        let reporter = Reporter::new("<stdin>", &buffer);
        match engine.run("<stdin>", &buffer, &mut |d| reporter.report(d)) {
            Ok(Value::Null) => {}
            Ok(value) => println!("{}", paint(value, args.color)),
            Err(Error::Exit { code }) => return code,
            Err(Error::AssertionFailed { message }) => {
                eprintln!("{message}");
                return 1;
            }
            Err(other) => render_error(&other),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = EngineOptions::default().with_max_depth(args.max_depth);
    let arena = Bump::new();
    let mut engine = Engine::new(&arena, options, |_, _| {});

    let status = if let Some(path) = &args.file {
        run_file(&mut engine, path, &args)
    } else if atty::is(atty::Stream::Stdin) {
        run_repl(&mut engine, &args)
    } else {
        run_stdin(&mut engine, &args)?
    };

    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}
