fn main() -> anyhow::Result<()> {
    stackcraft::run()?;
    Ok(())
}
