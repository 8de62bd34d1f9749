use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::eyre::Result;
use heed::{Database, Env, EnvOpenOptions, types::*};

use crate::config::get_data_dir;
use crate::domain::registration::TokenRegistry;
use crate::domain::token::{RegisteredToken, Token};

/// Wrapper around LMDB database for the persistent token registry.
///
/// Each network gets its own environment under the data directory, so
/// switching networks never mixes registries.
#[derive(Clone)]
pub struct Store {
    env: Env,
}

impl Store {
    pub fn new(network: &str) -> Result<Self> {
        Self::with_path(get_data_dir().join(network).join("registry.mdb"))
    }

    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(100 * 1024 * 1024) // 100MB
                .max_dbs(10)
                .open(path)?
        };
        Ok(Self { env })
    }

    fn tokens_db(&self, wtxn: &mut heed::RwTxn) -> Result<Database<Str, SerdeRmp<RegisteredToken>>> {
        Ok(self.env.create_database(wtxn, Some("tokens"))?)
    }

    fn tokens_db_ro(
        &self,
        rtxn: &heed::RoTxn,
    ) -> Result<Option<Database<Str, SerdeRmp<RegisteredToken>>>> {
        Ok(self.env.open_database(rtxn, Some("tokens"))?)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TokenRegistry for Store {
    fn add_token(&self, token: &Token) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db = self.tokens_db(&mut wtxn)?;
        let entry = RegisteredToken {
            token: token.clone(),
            registered_at: now_secs(),
        };
        db.put(&mut wtxn, &token.uid, &entry)?;
        wtxn.commit()?;
        Ok(())
    }

    fn remove_token(&self, uid: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db = self.tokens_db(&mut wtxn)?;
        db.delete(&mut wtxn, uid)?;
        wtxn.commit()?;
        Ok(())
    }

    fn get(&self, uid: &str) -> Result<Option<RegisteredToken>> {
        let rtxn = self.env.read_txn()?;
        match self.tokens_db_ro(&rtxn)? {
            Some(db) => Ok(db.get(&rtxn, uid)?),
            None => Ok(None),
        }
    }

    fn contains(&self, uid: &str) -> Result<bool> {
        Ok(self.get(uid)?.is_some())
    }

    fn all_tokens(&self) -> Result<Vec<RegisteredToken>> {
        let rtxn = self.env.read_txn()?;
        let mut tokens = Vec::new();
        if let Some(db) = self.tokens_db_ro(&rtxn)? {
            for result in db.iter(&rtxn)? {
                let (_, entry) = result?;
                tokens.push(entry);
            }
        }
        tokens.sort_by_key(|t| t.token.name.to_lowercase());
        Ok(tokens)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<RegisteredToken>> {
        let rtxn = self.env.read_txn()?;
        if let Some(db) = self.tokens_db_ro(&rtxn)? {
            for result in db.iter(&rtxn)? {
                let (_, entry) = result?;
                if entry.token.name.eq_ignore_ascii_case(name) {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }

    fn find_by_symbol(&self, symbol: &str) -> Result<Option<RegisteredToken>> {
        let rtxn = self.env.read_txn()?;
        if let Some(db) = self.tokens_db_ro(&rtxn)? {
            for result in db.iter(&rtxn)? {
                let (_, entry) = result?;
                if entry.token.symbol.eq_ignore_ascii_case(symbol) {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }
}
