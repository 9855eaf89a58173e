pub mod command;
pub mod parse;

use crate::fs::{init::perform_session_boot, FileSystem};
use crate::shell::{command::execute_command, parse::parse_command};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use std::{
    error::Error,
    io::stdout,
    path::PathBuf,
    sync::mpsc,
    thread,
};

/// Progress events reported by the boot worker to the shell.
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<FileSystem, Box<dyn Error + Send + Sync>>),
}

pub fn start_shell() {
    let mut fs = match boot_session() {
        Some(fs) => fs,
        None => return,
    };

    let username = whoami::username();
    let hostname = whoami::hostname();

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    // 初始化 reedline
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".remotefs_history");

    let mut line_editor = Reedline::create().with_history(Box::new(
        reedline::FileBackedHistory::with_file(100, history_path).unwrap(),
    ));

    // 命令补全
    let commands: Vec<String> = vec![
        "help", "open", "close", "read", "write", "seek", "files", "stat", "cache", "exit",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let completer = reedline::DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!("{}@{}", username, hostname)),
        DefaultPromptSegment::Basic("RemoteFS".to_string()),
    );

    loop {
        let input = line_editor.read_line(&prompt);

        match input {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(command::Command::Exit) => {
                        if confirm_exit(&mut fs) {
                            println!("{}", "👋 Bye!".bright_yellow());
                            break;
                        }
                    }
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut fs) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                if confirm_exit(&mut fs) {
                    println!("{}", "Exiting RemoteFS...".yellow());
                    break;
                }
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// Run the boot worker and animate its progress. Returns the mounted
/// session, or None when boot failed.
fn boot_session() -> Option<FileSystem> {
    let mut stdout = stdout();

    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)).unwrap();
    println!("{}", "[RemoteFS Booting...]".bright_yellow().bold());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || perform_session_boot(tx));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let fs = loop {
        match rx.recv() {
            Ok(BootProgress::Step(step)) => pb.println(step),
            Ok(BootProgress::Progress(i)) => pb.set_position(i),
            Ok(BootProgress::Finished(Ok(fs))) => {
                pb.finish_with_message("✅ Ready!");
                break fs;
            }
            Ok(BootProgress::Finished(Err(e))) => {
                pb.abandon_with_message("❌ Boot failed");
                println!("{} {}", "❌ Error:".red().bold(), e);
                return None;
            }
            Err(_) => {
                pb.abandon_with_message("❌ Boot worker died");
                return None;
            }
        }
    };

    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print("Welcome to RemoteFS v0.1.0\n"),
        ResetColor
    )
    .unwrap();
    println!(
        "{} {}  {} {}",
        "Session".bright_black(),
        fs.session_id().bright_black(),
        "controller".bright_black(),
        format!("{}:{}", fs.endpoint().address, fs.endpoint().port).bright_black()
    );

    Some(fs)
}

/// Unmount and allow the shell to quit. Open files ask for confirmation.
fn confirm_exit(fs: &mut FileSystem) -> bool {
    let open = fs.open_file_count();
    if open > 0 {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("{} file(s) still open. Unmount and exit?", open))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            return false;
        }
    }

    if fs.is_mounted() {
        if let Err(e) = fs.unmount() {
            println!("{} {}", "❌ Unmount failed:".red().bold(), e);
        } else {
            println!("{}", "💾 Session unmounted.".green());
        }
    }
    true
}
