use std::io;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};
use log::{debug, warn};

use crate::error::{Result, SyncError};
use crate::teams::{Team, TeamDirectory};

/// NotFound の後に聞き直す回数
const RETRIES: usize = 1;

/// 対話型のチーム選択
pub struct TeamSelector {
    directory: TeamDirectory,
    term: Term,
    theme: ColorfulTheme,
}

impl TeamSelector {
    pub fn new(directory: TeamDirectory) -> Self {
        Self {
            directory,
            term: Term::stdout(),
            theme: ColorfulTheme::default(),
        }
    }

    /// 一覧を表示し、入力されたチームを返す
    pub fn select(&self) -> Result<&'static Team> {
        self.term.write_line(&render_listing(&self.directory))?;
        resolve_with_retry(&self.directory, || self.read_choice())
    }

    fn read_choice(&self) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Enter team number or name")
            .interact_text_on(&self.term)
            .map_err(|e| SyncError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }
}

/// チーム一覧の表示文字列
pub fn render_listing(directory: &TeamDirectory) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", style("⚽ Football Calendar Sync").bold().underlined()));
    out.push_str(&"=".repeat(60));
    out.push_str("\n\nAvailable teams:\n\n");
    for (idx, team) in directory.list().iter().enumerate() {
        out.push_str(&format!("  {:2}. {}\n", idx + 1, team.name));
    }
    out.push_str("\n  Or type a team name to search\n");
    out
}

/// 入力を読み、見つからなければ一度だけ聞き直す
pub fn resolve_with_retry<F>(directory: &TeamDirectory, mut read_line: F) -> Result<&'static Team>
where
    F: FnMut() -> Result<String>,
{
    let mut attempt = 0;
    loop {
        let choice = read_line()?;
        match directory.lookup(&choice) {
            Ok(team) => {
                debug!("Resolved '{}' to {}", choice.trim(), team.name);
                println!("\n✅ Selected: {}", style(team.name).green());
                return Ok(team);
            }
            Err(SyncError::NotFound(query)) if attempt < RETRIES => {
                warn!("No team matches '{}'", query);
                println!("\n❌ Team '{}' not found in the list, try again", query);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(inputs: &[&str]) -> impl FnMut() -> Result<String> {
        let mut inputs: Vec<String> = inputs.iter().rev().map(|s| s.to_string()).collect();
        move || {
            inputs
                .pop()
                .ok_or_else(|| SyncError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "no input")))
        }
    }

    #[test]
    fn listing_is_numbered_in_display_order() {
        let listing = render_listing(&TeamDirectory::new());
        assert!(listing.contains("   1. Arsenal FC\n"));
        assert!(listing.contains("   5. Borussia Dortmund\n"));
        assert!(listing.contains("  13. Real Madrid CF\n"));
    }

    #[test]
    fn resolves_first_answer() {
        let team = resolve_with_retry(&TeamDirectory::new(), scripted(&["barca"])).unwrap();
        assert_eq!(team.name, "FC Barcelona");
    }

    #[test]
    fn reprompts_once_after_not_found() {
        let team = resolve_with_retry(&TeamDirectory::new(), scripted(&["wrexham", "5"])).unwrap();
        assert_eq!(team.key, "dortmund");
    }

    #[test]
    fn gives_up_after_second_miss() {
        let mut calls = 0;
        let mut read = scripted(&["wrexham", "99", "arsenal"]);
        let err = resolve_with_retry(&TeamDirectory::new(), || {
            calls += 1;
            read()
        })
        .unwrap_err();

        assert!(matches!(err, SyncError::NotFound(ref q) if q == "99"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn input_failure_is_propagated() {
        let err = resolve_with_retry(&TeamDirectory::new(), scripted(&[])).unwrap_err();
        assert!(matches!(err, SyncError::Io(_)));
    }
}
