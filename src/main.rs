use remote_fs::shell::start_shell;

fn main() {
    start_shell();
}
