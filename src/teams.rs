use crate::error::{Result, SyncError};

/// 選択可能なチーム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    /// 短縮キー（小文字）
    pub key: &'static str,

    /// football-data.org のチームID
    pub id: u32,

    /// 表示名
    pub name: &'static str,

    /// 大会コード（BL1, PL など）
    pub competition: &'static str,

    /// 通称（小文字、完全一致で検索）
    pub aliases: &'static [&'static str],
}

// 検索順は定義順、表示はキー順
const TEAMS: &[Team] = &[
    Team { key: "dortmund", id: 4, name: "Borussia Dortmund", competition: "BL1", aliases: &["bvb", "borussia"] },
    Team { key: "bayern", id: 5, name: "FC Bayern München", competition: "BL1", aliases: &["bayern munich", "bayern münchen"] },
    Team { key: "barcelona", id: 81, name: "FC Barcelona", competition: "PD", aliases: &["barca", "barça"] },
    Team { key: "real madrid", id: 86, name: "Real Madrid CF", competition: "PD", aliases: &["real", "madrid"] },
    Team { key: "manchester united", id: 66, name: "Manchester United FC", competition: "PL", aliases: &["man utd", "man united", "mufc"] },
    Team { key: "liverpool", id: 64, name: "Liverpool FC", competition: "PL", aliases: &["lfc"] },
    Team { key: "arsenal", id: 57, name: "Arsenal FC", competition: "PL", aliases: &["gunners"] },
    Team { key: "chelsea", id: 61, name: "Chelsea FC", competition: "PL", aliases: &["cfc"] },
    Team { key: "manchester city", id: 65, name: "Manchester City FC", competition: "PL", aliases: &["man city", "mcfc"] },
    Team { key: "psg", id: 524, name: "Paris Saint-Germain FC", competition: "FL1", aliases: &["paris"] },
    Team { key: "juventus", id: 109, name: "Juventus FC", competition: "SA", aliases: &["juve"] },
    Team { key: "inter", id: 108, name: "FC Internazionale Milano", competition: "SA", aliases: &["inter milan", "internazionale"] },
    Team { key: "milan", id: 98, name: "AC Milan", competition: "SA", aliases: &["ac milan"] },
];

/// 静的なチーム一覧
#[derive(Debug, Clone, Copy)]
pub struct TeamDirectory {
    teams: &'static [Team],
}

impl Default for TeamDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self { teams: TEAMS }
    }

    /// 任意のチーム一覧から作成（与えた順が検索順）
    pub fn with_teams(teams: &'static [Team]) -> Self {
        Self { teams }
    }

    /// 表示順（キーのアルファベット順）のチーム一覧
    pub fn list(&self) -> Vec<&'static Team> {
        let teams = self.teams;
        let mut listed: Vec<&'static Team> = teams.iter().collect();
        listed.sort_by_key(|t| t.key);
        listed
    }

    /// 番号（1始まり）またはチーム名でチームを検索する
    ///
    /// 数字のみの入力は表示順の番号として扱い、範囲外なら NotFound。
    /// それ以外は大文字小文字を区別せず、キーの完全一致、通称の完全一致、
    /// 表示名かキーへの部分一致の順に調べる。部分一致は定義順で最初のチーム。
    pub fn lookup(&self, query: &str) -> Result<&'static Team> {
        let teams = self.teams;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(SyncError::NotFound(query));
        }

        if query.chars().all(|c| c.is_ascii_digit()) {
            let listed = self.list();
            return query
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| listed.get(idx).copied())
                .ok_or(SyncError::NotFound(query));
        }

        if let Some(team) = teams.iter().find(|t| t.key == query) {
            return Ok(team);
        }

        if let Some(team) = teams.iter().find(|t| t.aliases.iter().any(|a| *a == query)) {
            return Ok(team);
        }

        teams
            .iter()
            .find(|t| t.name.to_lowercase().contains(&query) || t.key.contains(&query))
            .ok_or(SyncError::NotFound(query))
    }
}
