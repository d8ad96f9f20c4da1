use anyhow::Result;

fn main() -> Result<()> {
    ncflag_cli::main_entry()
}
