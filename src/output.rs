//! Output formatting for ranked search hits

use crate::query::executor::{HitKind, SearchHit};
use crate::query::scorer::MatchKind;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print hits in the default human-readable format
pub fn print_hits(hits: &[SearchHit], color: bool, verbose: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    if hits.is_empty() {
        writeln!(stdout, "No results")?;
        return Ok(());
    }

    for hit in hits {
        // Score column
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{:>7.1}", hit.score)?;
        stdout.reset()?;
        write!(stdout, "  ")?;

        match &hit.kind {
            HitKind::Document => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
                write!(stdout, "{}", hit.link)?;
                stdout.reset()?;
                if !hit.title.is_empty() {
                    write!(stdout, "  {}", hit.title)?;
                }
            }
            HitKind::Object { name, type_label } => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
                write!(stdout, "{}", hit.link)?;
                stdout.reset()?;
                write!(stdout, "  ")?;
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(stdout, "{}", name)?;
                stdout.reset()?;
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(stdout, " [{}]", type_label)?;
                stdout.reset()?;
            }
        }
        writeln!(stdout)?;

        if verbose && !hit.matched.is_empty() {
            if let HitKind::Document = hit.kind {
                for m in &hit.matched {
                    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                    write!(stdout, "         {} ", match_label(m.kind))?;
                    stdout.reset()?;
                    if m.word == m.term {
                        writeln!(stdout, "{}", m.term)?;
                    } else {
                        writeln!(stdout, "{} ({})", m.term, m.word)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn match_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Term => "term   ",
        MatchKind::PartialTerm => "partial",
        MatchKind::Title => "title  ",
        MatchKind::PartialTitle => "~title ",
    }
}

/// Print hits as a JSON array for scripting
pub fn print_hits_json(hits: &[SearchHit]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, hits)?;
    writeln!(handle)?;
    Ok(())
}

/// Print only the page links, one per line (for piping)
pub fn print_links_only(hits: &[SearchHit]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    let mut seen = std::collections::HashSet::new();
    for hit in hits {
        if seen.insert(hit.link.as_str()) {
            writeln!(stdout, "{}", hit.link)?;
        }
    }

    Ok(())
}
