fn main() -> anyhow::Result<()> {
    maat_cli::run_cli()
}
