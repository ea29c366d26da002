use clap::{Parser, Subcommand};
use refind::config::{self, Settings};
use refind::storage::JsonFileStore;
use refind::{
    build_rewritten_url, detect, Background, ContentScript, FocusedElement, InstallReason,
    KeyCombo, KeyEvent, KeyOutcome, Rewrite, ShortcutEditor,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "refind")]
#[command(about = "Keyboard shortcuts that refine search engine queries", version)]
struct Cli {
    /// Directory holding shortcut storage (overrides settings)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured shortcuts
    List,

    /// Add a shortcut
    Add {
        /// Key combination, e.g. "Meta+Shift+E"
        keys: KeyCombo,
        /// Term appended to the query, e.g. "site:reddit.com"
        term: String,
    },

    /// Change the keys and term of a shortcut
    Edit {
        id: u32,
        keys: KeyCombo,
        term: String,
    },

    /// Delete a shortcut
    Remove { id: u32 },

    /// Enable a shortcut
    Enable { id: u32 },

    /// Disable a shortcut
    Disable { id: u32 },

    /// Check a key combination against common browser shortcuts
    Conflict { keys: KeyCombo },

    /// Append a term to the query of a search results URL
    Rewrite { url: String, term: String },

    /// Simulate a key press on a search results page
    Press {
        url: String,
        keys: KeyCombo,
        /// Name attribute of the focused input, if any
        #[arg(long)]
        focus_name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Ignoring settings: {}", e);
            Settings::default()
        }
    };

    // Initialize logging
    let env = env_logger::Env::default().default_filter_or(&settings.log_filter);
    env_logger::Builder::from_env(env).init();

    log::info!("Starting {} v{}", config::APP_NAME, config::APP_VERSION);
    log::debug!("Application id {}", config::APP_ID);

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let data_dir = cli.data_dir.unwrap_or_else(|| settings.data_dir());
    let fresh_install = !data_dir.join(config::STORAGE_FILE).exists();

    let store = Rc::new(JsonFileStore::open(&data_dir)?);
    let background = Rc::new(Background::new(store.clone()));

    if fresh_install {
        background.on_installed(InstallReason::Install)?;
    }

    match cli.command {
        Commands::List => {
            let editor = ShortcutEditor::load(background);
            if editor.shortcuts().is_empty() {
                println!("No shortcuts configured");
            }
            for shortcut in editor.shortcuts() {
                let state = if shortcut.enabled { "on" } else { "off" };
                let keys = shortcut.keys.to_string();
                println!("{:>3}  {:<20} {:<4} {}", shortcut.id, keys, state, shortcut.term);
            }
        }
        Commands::Add { keys, term } => {
            let mut editor = ShortcutEditor::load(background);
            warn_conflict(&editor, &keys);
            let id = editor.add(keys, &term)?;
            println!("Added shortcut {}", id);
        }
        Commands::Edit { id, keys, term } => {
            let mut editor = ShortcutEditor::load(background);
            warn_conflict(&editor, &keys);
            editor.update(id, keys, &term)?;
            println!("Updated shortcut {}", id);
        }
        Commands::Remove { id } => {
            ShortcutEditor::load(background).delete(id)?;
            println!("Removed shortcut {}", id);
        }
        Commands::Enable { id } => {
            ShortcutEditor::load(background).set_enabled(id, true)?;
        }
        Commands::Disable { id } => {
            ShortcutEditor::load(background).set_enabled(id, false)?;
        }
        Commands::Conflict { keys } => match refind::shortcut::check_browser_conflict(&keys) {
            Some(description) => println!("{} conflicts with \"{}\"", keys, description),
            None => println!("{} has no known conflict", keys),
        },
        Commands::Rewrite { url, term } => {
            let engine = detect(&url).ok_or("not a supported search engine results page")?;
            match build_rewritten_url(&url, engine.query_param, &term)? {
                Rewrite::Navigate(url) => println!("{}", url),
                Rewrite::Unchanged => println!("{}", url),
            }
        }
        Commands::Press { url, keys, focus_name } => {
            let mut script = ContentScript::new();
            script.initialize(background.as_ref());
            if !script.is_listening() {
                eprintln!("Warning: shortcuts unavailable, key presses are ignored");
            }

            let focused = focus_name.map(|name| FocusedElement::new("INPUT").with_name(name));
            let event = KeyEvent::from(&keys);

            match script.handle_keydown(&event, focused.as_ref(), &url)? {
                KeyOutcome::Navigate(url) => println!("{}", url),
                KeyOutcome::Unchanged => println!("{} (unchanged)", url),
                KeyOutcome::Ignored => println!("ignored"),
            }
        }
    }

    Ok(())
}

fn warn_conflict(editor: &ShortcutEditor, keys: &KeyCombo) {
    if let Some(description) = editor.conflict_for(keys) {
        eprintln!("Warning: {} conflicts with \"{}\"", keys, description);
    }
}
