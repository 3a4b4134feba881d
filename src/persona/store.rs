//! SQLite repository for persona rows.
//!
//! Personas are created and edited outside the core components; the
//! composer and prompt builders only ever receive persona values. The
//! repository opens a fresh connection per operation and creates its table
//! on first use.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::persona::Persona;

/// SQLite-backed persona repository.
pub struct PersonaStore {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl PersonaStore {
    /// Open (and initialize) a persona store at `db_path`.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self { db_path };
        store.initialize_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection, anyhow::Error> {
        Connection::open(&self.db_path).map_err(|e| {
            log::error!("persona store: failed to open {}: {}", self.db_path.display(), e);
            anyhow::Error::from(e)
        })
    }

    fn initialize_db(&self) -> Result<(), anyhow::Error> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS team_leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                personality TEXT NOT NULL DEFAULT '',
                strategic_focus TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a persona and return it with its assigned id.
    pub fn add(
        &self,
        name: &str,
        role: &str,
        personality: &str,
        strategic_focus: &str,
    ) -> Result<Persona, anyhow::Error> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO team_leads (name, role, personality, strategic_focus)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, role, personality, strategic_focus],
        )?;
        Ok(Persona {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            role: role.to_string(),
            personality: personality.to_string(),
            strategic_focus: strategic_focus.to_string(),
        })
    }

    /// All personas, ordered by id.
    pub fn all(&self) -> Result<Vec<Persona>, anyhow::Error> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, role, personality, strategic_focus
             FROM team_leads ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Persona {
                id: row.get(0)?,
                name: row.get(1)?,
                role: row.get(2)?,
                personality: row.get(3)?,
                strategic_focus: row.get(4)?,
            })
        })?;
        let mut personas = Vec::new();
        for row in rows {
            personas.push(row?);
        }
        Ok(personas)
    }

    /// Look up a persona by its display name.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Persona>, anyhow::Error> {
        let conn = self.open()?;
        let persona = conn
            .query_row(
                "SELECT id, name, role, personality, strategic_focus
                 FROM team_leads WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Persona {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        role: row.get(2)?,
                        personality: row.get(3)?,
                        strategic_focus: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(persona)
    }

    /// Replace every editable field of one persona. The id never changes,
    /// which is what keeps id-keyed framework overlays valid across renames.
    pub fn update(
        &self,
        id: i64,
        name: &str,
        role: &str,
        personality: &str,
        strategic_focus: &str,
    ) -> Result<(), anyhow::Error> {
        let conn = self.open()?;
        conn.execute(
            "UPDATE team_leads
             SET name = ?2, role = ?3, personality = ?4, strategic_focus = ?5
             WHERE id = ?1",
            params![id, name, role, personality, strategic_focus],
        )?;
        Ok(())
    }

    /// Delete every persona row.
    pub fn clear(&self) -> Result<(), anyhow::Error> {
        let conn = self.open()?;
        conn.execute("DELETE FROM team_leads", [])?;
        Ok(())
    }

    /// Insert the built-in sample team-lead roster.
    pub fn seed_samples(&self) -> Result<(), anyhow::Error> {
        for (name, role, personality, strategic_focus) in SAMPLE_LEADS {
            self.add(name, role, personality, strategic_focus)?;
        }
        Ok(())
    }
}

/// Sample team-lead rows used to bootstrap an empty roster.
pub const SAMPLE_LEADS: [(&str, &str, &str, &str); 3] = [
    (
        "의류기획팀 팀장",
        "의류 기획 파트 리더",
        "시즌 트렌드와 판매 데이터 기반의 제품을 제안하며, 제품의 생산 가능성과 원가 구조 고려해야함. 기존 제품과의 포지셔닝 충돌 방지등을 고려",
        "시장성과 브랜드 정체성을 모두 만족시키는 시즌별 상품 라인업을 구성하고, 판매 예측에 기반한 효율적인 상품 기획을 수행하는 것.",
    ),
    (
        "마케팅팀 PL",
        "마케팅 파트 리더",
        "타겟 고객과의 접점을 중심으로 콘텐츠 기획하며 예산 대비 ROI 높은 캠페인을 제안검토 노출, 전환, 참여율 등 데이터 중심으로 접근",
        "각 시즌 캠페인, 디지털 콘텐츠, SNS, 광고 등 마케팅 활동을 통해 브랜드 가치를 강화하고 판매 전환율을 극대화하는 것.",
    ),
    (
        "의류디자인 팀장",
        "의류 디자인 파트 리더",
        "브랜드의 철학과 이미지에 부합하는 디자인 제안. 소재, 컬러, 실루엣 등 트렌드를 분석해 디자인 방향 설정. 시즌별 핵심 제품군(헤리티지, 기능성, 포인트 아이템 등)에 대한 명확한 디자인 의도 설명",
        "브랜드 아이덴티티와 시즌 트렌드를 반영한 창의적이고 상업성 있는 디자인을 통해 소비자에게 매력적인 제품을 제공하는 것.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, PersonaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PersonaStore::new(dir.path().join("leads.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_and_fetch_all() {
        let (_dir, store) = temp_store();
        let p = store.add("기획팀장", "기획 리더", "A\nB", "G").unwrap();
        assert!(p.id > 0);

        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "기획팀장");
        assert_eq!(all[0].personality, "A\nB");
    }

    #[test]
    fn test_find_by_name() {
        let (_dir, store) = temp_store();
        store.add("기획팀장", "기획 리더", "", "").unwrap();
        assert!(store.find_by_name("기획팀장").unwrap().is_some());
        assert!(store.find_by_name("없는팀장").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_id_across_rename() {
        let (_dir, store) = temp_store();
        let p = store.add("기획팀장", "기획 리더", "A", "G").unwrap();
        store
            .update(p.id, "상품기획팀장", "기획 리더", "A", "G")
            .unwrap();
        let renamed = store.find_by_name("상품기획팀장").unwrap().unwrap();
        assert_eq!(renamed.id, p.id);
    }

    #[test]
    fn test_seed_samples_inserts_three_rows() {
        let (_dir, store) = temp_store();
        store.seed_samples().unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "의류기획팀 팀장");
    }

    #[test]
    fn test_clear_empties_roster() {
        let (_dir, store) = temp_store();
        store.seed_samples().unwrap();
        store.clear().unwrap();
        assert!(store.all().unwrap().is_empty());
    }
}
