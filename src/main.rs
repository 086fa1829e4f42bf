fn main() -> std::process::ExitCode {
    launcher_archive_lib::run()
}
