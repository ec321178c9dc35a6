fn main() -> std::process::ExitCode {
    emr_panel_lib::run()
}
