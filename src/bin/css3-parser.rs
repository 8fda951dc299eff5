use anyhow::{anyhow, Result};
use cssyntax::css3::errors::ParseError;
use cssyntax::shared::byte_stream::Location;
use cssyntax::{Css3, CssError, ParserConfig, Tokenization};
use simple_logger::SimpleLogger;
use std::fs;

fn main() -> Result<()> {
    let matches = clap::Command::new("Cssyntax CSS3 parser")
        .version("0.1.0")
        .arg(
            clap::Arg::new("file")
                .help("The css file to parse")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("debug")
                .help("Enable debug logging")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("tokens")
                .help("Just print the tokens")
                .long("tokens")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("ignore-errors")
                .help("Ignore errors")
                .long("ignore-errors")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("eager")
                .help("Tokenize the whole file before parsing")
                .long("eager")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .help("Print the tree as JSON")
                .long("json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("quiet")
                .help("Don't display the tree")
                .long("quiet")
                .short('q')
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    let quiet = matches.get_flag("quiet");
    let json = matches.get_flag("json");
    let tokens = matches.get_flag("tokens");
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow!("missing file argument"))?
        .to_string();

    if debug {
        SimpleLogger::new().init()?;
    }

    let css = fs::read(&file)?;

    let config = ParserConfig {
        source: Some(file.clone()),
        ignore_errors: matches.get_flag("ignore-errors"),
        tokenization: if matches.get_flag("eager") {
            Tokenization::Eager
        } else {
            Tokenization::Lazy
        },
        ..Default::default()
    };

    let source = String::from_utf8_lossy(&css);
    log::debug!("read {} bytes from {}", css.len(), file);

    if tokens {
        let parsed = Css3::tokenize(&css, config).map_err(|err| fatal(&source, err))?;
        for token in &parsed.value {
            println!("{:?} {}", token.location, token);
        }
        print_errors(&source, &parsed.errors);
        return Ok(());
    }

    let parsed = Css3::parse_bytes(&css, config).map_err(|err| fatal(&source, err))?;

    if !quiet {
        if json {
            println!("{}", serde_json::to_string_pretty(&parsed.value)?);
        } else {
            println!("{:#?}", parsed.value);
        }
    }

    print_errors(&source, &parsed.errors);

    Ok(())
}

fn fatal(css: &str, err: CssError) -> anyhow::Error {
    match &err {
        CssError::UnsupportedUnicodeRange(loc) | CssError::UnterminatedComment(loc) | CssError::NestingTooDeep(loc) => {
            display_snippet(css, *loc)
        }
        CssError::Internal { location, .. } => display_snippet(css, *location),
        CssError::InvalidUtf8 { .. } | CssError::UnsupportedEncoding(_) => {}
    }

    anyhow!(err)
}

fn print_errors(css: &str, errors: &[ParseError]) {
    for err in errors {
        eprintln!("{err}");
        display_snippet(css, err.location);
    }

    if !errors.is_empty() {
        eprintln!("{} parse error(s)", errors.len());
    }
}

fn display_snippet(css: &str, loc: Location) {
    let lines: Vec<&str> = css.split('\n').collect();
    let line_nr = loc.line.saturating_sub(1);
    let col_nr = loc.column.saturating_sub(1);

    if col_nr > 1000 {
        eprintln!("Error is too far to the right to display.");
        return;
    }

    eprintln!();

    // Print the previous 3 lines
    for n in line_nr.saturating_sub(3)..line_nr {
        if let Some(line) = lines.get(n) {
            eprintln!("{:<5}|{}", n + 1, line);
        }
    }

    // Print the line with the error and a pointer to the error
    if let Some(line) = lines.get(line_nr) {
        eprintln!("{:<5}|{}", line_nr + 1, line);
        eprintln!("     |{}^", "-".repeat(col_nr));
    }

    eprintln!();
}
