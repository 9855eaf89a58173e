use crate::fs::file_table::Handle;
use crate::fs::FileSystem;
use colored::*;
use std::error::Error;

#[derive(Debug)]
pub enum Command {
    Help,
    Open(String),
    Close(Handle),
    Read(Handle, usize),
    Write(Handle, String),
    Seek(Handle, i64),
    Files,
    Stat(Handle),
    Cache,
    Exit,
}

pub fn execute_command(cmd: &Command, fs: &mut FileSystem) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Open(name) => {
            let handle = fs.open(name)?;
            println!("📄 Opened {} with handle {}", name.green(), handle.to_string().cyan());
        }
        Command::Close(handle) => {
            fs.close(*handle)?;
            println!("✅ Closed handle {}", handle.to_string().cyan());
        }
        Command::Read(handle, count) => {
            let bytes = fs.read(*handle, *count)?;
            println!(
                "📖 Read {} byte(s){}",
                bytes.len().to_string().cyan(),
                if bytes.len() < *count { " (end of data)".bright_black() } else { "".normal() }
            );
            if !bytes.is_empty() {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        Command::Write(handle, text) => {
            let written = fs.write(*handle, text.as_bytes())?;
            println!("✏️  Wrote {} byte(s)", written.to_string().cyan());
        }
        Command::Seek(handle, offset) => {
            fs.seek(*handle, *offset)?;
            println!("📍 Position set to {}", offset.to_string().cyan());
        }
        Command::Files => {
            let mut any = false;
            println!(
                "{:<8} {:<20} {:>10} {:>10} {:>6}",
                "HANDLE".blue(),
                "NAME".blue(),
                "SIZE".blue(),
                "POS".blue(),
                "OPEN".blue()
            );
            for (handle, entry) in fs.files() {
                any = true;
                println!(
                    "{:<8} {:<20} {:>10} {:>10} {:>6}",
                    handle,
                    entry.name,
                    entry.size,
                    entry.position,
                    if entry.open { "yes".green() } else { "no".bright_black() }
                );
            }
            if !any {
                println!("{}", "(no files in this session)".bright_black());
            }
        }
        Command::Stat(handle) => {
            let entry = fs.stat(*handle)?;
            println!(
                "{}\n{}: {}\n{}: {} bytes\n{}: {}\n{}: {}\n",
                "📊 File Info".bright_yellow().bold(),
                "Name".blue(),
                entry.name,
                "Size".blue(),
                entry.size,
                "Position".blue(),
                entry.position,
                "Open".blue(),
                entry.open
            );
        }
        Command::Cache => print_cache_report(fs),
        Command::Exit => println!("{}", "👋 Exiting RemoteFS shell...".yellow().bold()),
    }

    Ok(())
}

fn print_cache_report(fs: &FileSystem) {
    let m = fs.cache_metrics();
    println!(
        "{} {}",
        "📊 Sector Cache Metrics".bright_yellow().bold(),
        chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!("{:<16} {:>8}", "Inserts".blue(), m.inserts);
    println!("{:<16} {:>8}", "Gets".blue(), m.gets);
    println!("{:<16} {:>8}", "Hits".blue(), m.hits);
    println!("{:<16} {:>8}", "Misses".blue(), m.misses);
    println!("{:<16} {:>7.2}%", "Hit ratio".blue(), m.hit_ratio * 100.0);
}

fn print_help() {
    println!("{}", "📘 RemoteFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  open <name>           Open a file, printing its handle
  close <handle>        Close an open file
  read <handle> <n>     Read n bytes at the current position
  write <handle> <str>  Write a string at the current position
  seek <handle> <off>   Move the file position
  files                 List the session's file table
  stat <handle>         Show file info
  cache                 Show sector cache metrics
  help                  Show this help message
  exit                  Unmount and quit the shell
"
        .bright_black()
    );
}
