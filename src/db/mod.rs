use crate::error::ElectError;
use crate::models::{Candidate, Election, ElectionMethod, Race, TallyRecord, User, Vote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
};
use std::collections::HashMap;
use std::env;
use uuid::Uuid;

/// Read-side interface the tallying core consumes. Implemented by
/// [`Database`]; the guard and tally engine only ever see this trait, so a
/// tally invocation is scoped to whatever handle the caller passes in.
#[async_trait]
pub trait BallotStore: Send + Sync {
    async fn get_election(&self, election_id: &str) -> Result<Election, ElectError>;
    async fn get_race(&self, race_id: &str) -> Result<Race, ElectError>;
    async fn candidates_of(&self, race_id: &str) -> Result<Vec<Candidate>, ElectError>;

    /// Summed vote value per candidate; candidates without votes are absent.
    async fn sum_votes_by_candidate(
        &self,
        race_id: &str,
    ) -> Result<HashMap<String, i64>, ElectError>;

    /// Number of votes cast across the race's candidates.
    async fn count_votes(&self, race_id: &str) -> Result<i64, ElectError>;

    /// Every ballot in the race, grouped as user -> candidate -> value.
    async fn ballots_by_user(
        &self,
        race_id: &str,
    ) -> Result<HashMap<String, HashMap<String, i64>>, ElectError>;

    /// Persist a tally snapshot for audit/history.
    async fn record_tally(
        &self,
        race_id: &str,
        method: ElectionMethod,
        payload: &str,
    ) -> Result<TallyRecord, ElectError>;
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new() -> Result<Self, ElectError> {
        // Get database URL from environment or use a default
        let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:elect.db".to_string());
        Self::connect(&db_url).await
    }

    pub async fn connect(db_url: &str) -> Result<Self, ElectError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Private in-memory database, one connection so the schema is shared.
    pub async fn in_memory() -> Result<Self, ElectError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), ElectError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS elections (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description_short TEXT,
                description_long TEXT,
                is_open BOOLEAN NOT NULL DEFAULT TRUE,
                default_method TEXT NOT NULL,
                admin_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                end_date TEXT,
                FOREIGN KEY (admin_id) REFERENCES users(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS races (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description_short TEXT,
                description_long TEXT,
                race_open BOOLEAN NOT NULL DEFAULT TRUE,
                method TEXT NOT NULL,
                min_vote_value INTEGER NOT NULL DEFAULT 0,
                max_vote_value INTEGER NOT NULL DEFAULT 1,
                election_id TEXT NOT NULL,
                FOREIGN KEY (election_id) REFERENCES elections(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description_short TEXT,
                description_long TEXT,
                race_id TEXT NOT NULL,
                FOREIGN KEY (race_id) REFERENCES races(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id TEXT PRIMARY KEY,
                value INTEGER NOT NULL,
                candidate_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                race_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, candidate_id),
                FOREIGN KEY (candidate_id) REFERENCES candidates(id),
                FOREIGN KEY (user_id) REFERENCES users(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tally_records (
                id TEXT PRIMARY KEY,
                race_id TEXT NOT NULL,
                method TEXT NOT NULL,
                payload TEXT NOT NULL,
                computed_at TEXT NOT NULL,
                FOREIGN KEY (race_id) REFERENCES races(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    // ----- users -----

    pub async fn create_user(&self, user: &User) -> Result<(), ElectError> {
        let duplicate = sqlx::query("SELECT 1 FROM users WHERE email = ?")
            .bind(&user.email)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if duplicate {
            return Err(ElectError::DuplicateEmail(user.email.clone()));
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ElectError> {
        let row = sqlx::query("SELECT id, name, email, password FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ElectError::NoUser(user_id.to_string()))?;

        Ok(User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password: row.get("password"),
        })
    }

    // ----- elections -----

    pub async fn create_election(&self, election: &Election) -> Result<(), ElectError> {
        sqlx::query(
            r#"
            INSERT INTO elections
                (id, title, description_short, description_long, is_open,
                 default_method, admin_id, created_at, end_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&election.id)
        .bind(&election.title)
        .bind(&election.description_short)
        .bind(&election.description_long)
        .bind(election.is_open)
        .bind(election.default_method.tag())
        .bind(&election.admin_id)
        .bind(election.created_at.to_rfc3339())
        .bind(election.end_date.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_election(&self, election_id: &str) -> Result<Election, ElectError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, is_open,
                   default_method, admin_id, created_at, end_date
            FROM elections
            WHERE id = ?
            "#,
        )
        .bind(election_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectError::NoElection(election_id.to_string()))?;

        election_from_row(&row)
    }

    pub async fn list_elections(&self) -> Result<Vec<Election>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, is_open,
                   default_method, admin_id, created_at, end_date
            FROM elections
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(election_from_row).collect()
    }

    /// Close an election and cascade the closure to all of its races. Once
    /// closed, none of the election's races accept votes any longer.
    pub async fn close_election(&self, election_id: &str) -> Result<(), ElectError> {
        // NoElection if it doesn't exist
        self.get_election(election_id).await?;

        sqlx::query("UPDATE elections SET is_open = FALSE WHERE id = ?")
            .bind(election_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE races SET race_open = FALSE WHERE election_id = ?")
            .bind(election_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Reopen an election. Deliberately does not cascade: races closed
    /// individually stay closed.
    pub async fn open_election(&self, election_id: &str) -> Result<(), ElectError> {
        self.get_election(election_id).await?;

        sqlx::query("UPDATE elections SET is_open = TRUE WHERE id = ?")
            .bind(election_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_election(&self, election_id: &str) -> Result<(), ElectError> {
        self.get_election(election_id).await?;

        for race in self.races_of(election_id).await? {
            self.delete_race(&race.id).await?;
        }
        sqlx::query("DELETE FROM elections WHERE id = ?")
            .bind(election_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Open elections whose end date has passed. RFC 3339 UTC strings order
    /// lexicographically, so the comparison happens in SQL.
    pub async fn get_expired_elections(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Election>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, is_open,
                   default_method, admin_id, created_at, end_date
            FROM elections
            WHERE end_date IS NOT NULL AND end_date < ? AND is_open = TRUE
            "#,
        )
        .bind(now.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(election_from_row).collect()
    }

    // ----- races -----

    pub async fn create_race(&self, race: &Race) -> Result<(), ElectError> {
        // NoElection if the parent doesn't exist
        self.get_election(&race.election_id).await?;

        sqlx::query(
            r#"
            INSERT INTO races
                (id, title, description_short, description_long, race_open,
                 method, min_vote_value, max_vote_value, election_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&race.id)
        .bind(&race.title)
        .bind(&race.description_short)
        .bind(&race.description_long)
        .bind(race.race_open)
        .bind(race.method.tag())
        .bind(race.min_vote_value)
        .bind(race.max_vote_value)
        .bind(&race.election_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_race(&self, race_id: &str) -> Result<Race, ElectError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, race_open,
                   method, min_vote_value, max_vote_value, election_id
            FROM races
            WHERE id = ?
            "#,
        )
        .bind(race_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectError::NoRace(race_id.to_string()))?;

        race_from_row(&row)
    }

    pub async fn races_of(&self, election_id: &str) -> Result<Vec<Race>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, race_open,
                   method, min_vote_value, max_vote_value, election_id
            FROM races
            WHERE election_id = ?
            "#,
        )
        .bind(election_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(race_from_row).collect()
    }

    /// Close a single race without touching its election. A closed race
    /// stops accepting votes; it becomes tallyable once its election is
    /// closed as well.
    pub async fn close_race(&self, race_id: &str) -> Result<(), ElectError> {
        self.get_race(race_id).await?;

        sqlx::query("UPDATE races SET race_open = FALSE WHERE id = ?")
            .bind(race_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Reopen a single race. Votes are only accepted again while the owning
    /// election is also open.
    pub async fn open_race(&self, race_id: &str) -> Result<(), ElectError> {
        self.get_race(race_id).await?;

        sqlx::query("UPDATE races SET race_open = TRUE WHERE id = ?")
            .bind(race_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a race along with its candidates and their votes.
    pub async fn delete_race(&self, race_id: &str) -> Result<(), ElectError> {
        self.get_race(race_id).await?;

        sqlx::query("DELETE FROM votes WHERE race_id = ?")
            .bind(race_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM candidates WHERE race_id = ?")
            .bind(race_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM races WHERE id = ?")
            .bind(race_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Switch a race's tallying method and recompute its vote-value range.
    pub async fn set_race_method(
        &self,
        race_id: &str,
        method: ElectionMethod,
    ) -> Result<Race, ElectError> {
        let mut race = self.get_race(race_id).await?;
        race.method = method;
        race.adjust_vote_range(self.count_candidates(race_id).await?);

        sqlx::query(
            "UPDATE races SET method = ?, min_vote_value = ?, max_vote_value = ? WHERE id = ?",
        )
        .bind(race.method.tag())
        .bind(race.min_vote_value)
        .bind(race.max_vote_value)
        .bind(race_id)
        .execute(&self.pool)
        .await?;

        Ok(race)
    }

    /// Set the race's vote-value range directly. The range invariant is
    /// re-applied before writing, so a write that violates it is normalized
    /// rather than rejected; on a non-ranked race any value other than [0, 1]
    /// is silently reset.
    pub async fn set_vote_range(
        &self,
        race_id: &str,
        min: i64,
        max: i64,
    ) -> Result<Race, ElectError> {
        let mut race = self.get_race(race_id).await?;
        race.min_vote_value = min;
        race.max_vote_value = max;
        race.adjust_vote_range(self.count_candidates(race_id).await?);
        if (race.min_vote_value, race.max_vote_value) != (min, max) {
            warn!(
                "vote range [{}, {}] for race {} normalized to [{}, {}]",
                min, max, race_id, race.min_vote_value, race.max_vote_value
            );
        }

        self.update_race_range(&race).await?;
        Ok(race)
    }

    async fn update_race_range(&self, race: &Race) -> Result<(), ElectError> {
        sqlx::query("UPDATE races SET min_vote_value = ?, max_vote_value = ? WHERE id = ?")
            .bind(race.min_vote_value)
            .bind(race.max_vote_value)
            .bind(&race.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ----- candidates -----

    /// Add a candidate to its race, widening the race's vote-value range if
    /// the ranked-method invariant requires it. This is the only way in, so
    /// the range can never silently drift out of step with the slate.
    pub async fn add_candidate(&self, candidate: &Candidate) -> Result<(), ElectError> {
        let mut race = self.get_race(&candidate.race_id).await?;
        // Count before the insert; the new candidate is the pending +1.
        let count = self.count_candidates(&race.id).await?;

        sqlx::query(
            r#"
            INSERT INTO candidates (id, title, description_short, description_long, race_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&candidate.id)
        .bind(&candidate.title)
        .bind(&candidate.description_short)
        .bind(&candidate.description_long)
        .bind(&candidate.race_id)
        .execute(&self.pool)
        .await?;

        race.adjust_vote_range(count + 1);
        self.update_race_range(&race).await?;

        Ok(())
    }

    /// Remove a candidate, its votes, and re-apply the range invariant.
    pub async fn remove_candidate(&self, candidate_id: &str) -> Result<(), ElectError> {
        let candidate = self.get_candidate(candidate_id).await?;

        sqlx::query("DELETE FROM votes WHERE candidate_id = ?")
            .bind(candidate_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM candidates WHERE id = ?")
            .bind(candidate_id)
            .execute(&self.pool)
            .await?;

        let mut race = self.get_race(&candidate.race_id).await?;
        let count = self.count_candidates(&race.id).await?;
        race.adjust_vote_range(count);
        self.update_race_range(&race).await?;

        Ok(())
    }

    pub async fn get_candidate(&self, candidate_id: &str) -> Result<Candidate, ElectError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, race_id
            FROM candidates
            WHERE id = ?
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectError::NoCandidate(candidate_id.to_string()))?;

        Ok(candidate_from_row(&row))
    }

    pub async fn count_candidates(&self, race_id: &str) -> Result<i64, ElectError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM candidates WHERE race_id = ?")
            .bind(race_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    // ----- votes -----

    /// Cast a vote for a candidate. The race and its election must both be
    /// open, the value must lie inside the race's range, and a user gets at
    /// most one vote per candidate.
    pub async fn cast_vote(
        &self,
        user_id: &str,
        candidate_id: &str,
        value: i64,
    ) -> Result<Vote, ElectError> {
        let candidate = self.get_candidate(candidate_id).await?;
        let race = self.get_race(&candidate.race_id).await?;
        let election = self.get_election(&race.election_id).await?;
        self.get_user(user_id).await?;

        if !race.race_open || !election.is_open {
            return Err(ElectError::VotingClosed(race.id));
        }
        if value < race.min_vote_value || value > race.max_vote_value {
            return Err(ElectError::InvalidVoteRange {
                value,
                min: race.min_vote_value,
                max: race.max_vote_value,
            });
        }

        let duplicate = sqlx::query("SELECT 1 FROM votes WHERE user_id = ? AND candidate_id = ?")
            .bind(user_id)
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if duplicate {
            return Err(ElectError::DuplicateVote {
                user_id: user_id.to_string(),
                candidate_id: candidate_id.to_string(),
            });
        }

        let vote = Vote {
            id: Uuid::new_v4().to_string(),
            value,
            candidate_id: candidate_id.to_string(),
            user_id: user_id.to_string(),
            race_id: race.id.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO votes (id, value, candidate_id, user_id, race_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vote.id)
        .bind(vote.value)
        .bind(&vote.candidate_id)
        .bind(&vote.user_id)
        .bind(&vote.race_id)
        .bind(vote.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(vote)
    }

    pub async fn get_vote(&self, vote_id: &str) -> Result<Vote, ElectError> {
        let row = sqlx::query(
            r#"
            SELECT id, value, candidate_id, user_id, race_id, created_at
            FROM votes
            WHERE id = ?
            "#,
        )
        .bind(vote_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectError::NoVote(vote_id.to_string()))?;

        vote_from_row(&row)
    }

    /// Change a cast vote's value. Subject to the same open-race and range
    /// checks as casting.
    pub async fn edit_vote(&self, vote_id: &str, value: i64) -> Result<Vote, ElectError> {
        let mut vote = self.get_vote(vote_id).await?;
        let race = self.get_race(&vote.race_id).await?;
        let election = self.get_election(&race.election_id).await?;

        if !race.race_open || !election.is_open {
            return Err(ElectError::VotingClosed(race.id));
        }
        if value < race.min_vote_value || value > race.max_vote_value {
            return Err(ElectError::InvalidVoteRange {
                value,
                min: race.min_vote_value,
                max: race.max_vote_value,
            });
        }

        sqlx::query("UPDATE votes SET value = ? WHERE id = ?")
            .bind(value)
            .bind(vote_id)
            .execute(&self.pool)
            .await?;

        vote.value = value;
        Ok(vote)
    }

    pub async fn tally_history(&self, race_id: &str) -> Result<Vec<TallyRecord>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT id, race_id, method, payload, computed_at
            FROM tally_records
            WHERE race_id = ?
            ORDER BY computed_at
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TallyRecord {
                    id: row.get("id"),
                    race_id: row.get("race_id"),
                    method: parse_method(row.get("method"))?,
                    payload: row.get("payload"),
                    computed_at: parse_utc(row.get("computed_at"))?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl BallotStore for Database {
    async fn get_election(&self, election_id: &str) -> Result<Election, ElectError> {
        Database::get_election(self, election_id).await
    }

    async fn get_race(&self, race_id: &str) -> Result<Race, ElectError> {
        Database::get_race(self, race_id).await
    }

    async fn candidates_of(&self, race_id: &str) -> Result<Vec<Candidate>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description_short, description_long, race_id
            FROM candidates
            WHERE race_id = ?
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(candidate_from_row).collect())
    }

    async fn sum_votes_by_candidate(
        &self,
        race_id: &str,
    ) -> Result<HashMap<String, i64>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT candidate_id, SUM(value) AS total
            FROM votes
            WHERE race_id = ?
            GROUP BY candidate_id
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<String, _>("candidate_id"), row.get::<i64, _>("total")))
            .collect())
    }

    async fn count_votes(&self, race_id: &str) -> Result<i64, ElectError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM votes WHERE race_id = ?")
            .bind(race_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n"))
    }

    async fn ballots_by_user(
        &self,
        race_id: &str,
    ) -> Result<HashMap<String, HashMap<String, i64>>, ElectError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, candidate_id, value
            FROM votes
            WHERE race_id = ?
            "#,
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await?;

        let mut ballots: HashMap<String, HashMap<String, i64>> = HashMap::new();
        for row in rows {
            ballots
                .entry(row.get::<String, _>("user_id"))
                .or_default()
                .insert(row.get::<String, _>("candidate_id"), row.get::<i64, _>("value"));
        }
        Ok(ballots)
    }

    async fn record_tally(
        &self,
        race_id: &str,
        method: ElectionMethod,
        payload: &str,
    ) -> Result<TallyRecord, ElectError> {
        let record = TallyRecord {
            id: Uuid::new_v4().to_string(),
            race_id: race_id.to_string(),
            method,
            payload: payload.to_string(),
            computed_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO tally_records (id, race_id, method, payload, computed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.race_id)
        .bind(record.method.tag())
        .bind(&record.payload)
        .bind(record.computed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(record)
    }
}

// ----- row mapping -----

fn parse_utc(raw: String) -> Result<DateTime<Utc>, ElectError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ElectError::Decode(format!("bad timestamp {raw:?}: {e}")))
}

fn parse_method(tag: String) -> Result<ElectionMethod, ElectError> {
    ElectionMethod::from_tag(&tag)
        .ok_or_else(|| ElectError::Decode(format!("unknown election method {tag:?}")))
}

fn election_from_row(row: &SqliteRow) -> Result<Election, ElectError> {
    let end_date = match row.get::<Option<String>, _>("end_date") {
        Some(raw) => Some(parse_utc(raw)?),
        None => None,
    };
    Ok(Election {
        id: row.get("id"),
        title: row.get("title"),
        description_short: row.get("description_short"),
        description_long: row.get("description_long"),
        is_open: row.get("is_open"),
        default_method: parse_method(row.get("default_method"))?,
        admin_id: row.get("admin_id"),
        created_at: parse_utc(row.get("created_at"))?,
        end_date,
    })
}

fn race_from_row(row: &SqliteRow) -> Result<Race, ElectError> {
    Ok(Race {
        id: row.get("id"),
        title: row.get("title"),
        description_short: row.get("description_short"),
        description_long: row.get("description_long"),
        race_open: row.get("race_open"),
        method: parse_method(row.get("method"))?,
        min_vote_value: row.get("min_vote_value"),
        max_vote_value: row.get("max_vote_value"),
        election_id: row.get("election_id"),
    })
}

fn candidate_from_row(row: &SqliteRow) -> Candidate {
    Candidate {
        id: row.get("id"),
        title: row.get("title"),
        description_short: row.get("description_short"),
        description_long: row.get("description_long"),
        race_id: row.get("race_id"),
    }
}

fn vote_from_row(row: &SqliteRow) -> Result<Vote, ElectError> {
    Ok(Vote {
        id: row.get("id"),
        value: row.get("value"),
        candidate_id: row.get("candidate_id"),
        user_id: row.get("user_id"),
        race_id: row.get("race_id"),
        created_at: parse_utc(row.get("created_at"))?,
    })
}
