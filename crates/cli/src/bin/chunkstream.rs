use anyhow::Result;

fn main() -> Result<()> {
    chunkstream_cli::main_entry()
}
