fn main() -> anyhow::Result<()> {
    orange_bump::run(orange_bump::DemoConfig::default())
}
