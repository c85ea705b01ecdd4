use console::style;
use strum::IntoEnumIterator;
use wren::providers::factory::ProviderType;

pub fn execute() {
    println!(
        "{} {}",
        style("wren").bold().green(),
        style(env!("CARGO_PKG_VERSION")).bold()
    );

    let providers: Vec<String> = ProviderType::iter()
        .map(|provider| format!("{} ({})", provider, provider.default_model()))
        .collect();
    println!("{} {}", style("providers:").dim(), providers.join(", "));
}
