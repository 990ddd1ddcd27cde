use console::{style, Term};
use tui_banner::{Align, Banner, ColorMode, Fill, Gradient, GradientDirection, Palette};

const DIM: u8 = 240;
const ACCENT: u8 = 203;

const TAGLINE: &str = "Multi-phase nmap reconnaissance";

/// Print the startup banner, build info and the output color legend.
pub fn show_banner() {
    let term = Term::stdout();
    let (_, term_cols) = term.size();
    let term_w = term_cols as usize;

    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let built = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");

    let palette = Palette::from_hex(&["#FF5F5F", "#FFAF5F", "#5FAFFF"]);
    let gradient = Gradient::new(palette.colors().to_vec(), GradientDirection::Diagonal);

    let banner_text = match Banner::new("genMAP") {
        Ok(b) => b
            .gradient(gradient)
            .fill(Fill::Keep)
            .align(Align::Left)
            .trim_vertical(true)
            .color_mode(ColorMode::TrueColor)
            .width(term_w)
            .render(),
        Err(_) => format!("{}\n", style("genMAP").color256(ACCENT).bold()),
    };

    println!();
    print!("{}", banner_text);
    println!(
        "  {}  {}",
        style(TAGLINE).white().bold(),
        style(format!("v{} ({}, built {})", version, git_hash, built)).color256(DIM),
    );
    println!();
    print_legend();
    println!();
}

fn print_legend() {
    println!(
        "  {} {}  {}  {}  {}  {}  {}",
        style("Legend:").dim(),
        style("open ports").red().bold(),
        style("service info").blue(),
        style("OS details").green(),
        style("vulnerabilities").yellow().bold(),
        style("directory services").magenta(),
        style("general info").white(),
    );
}
