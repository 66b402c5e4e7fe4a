use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::models::{
    tables, Character, CharacterProfession, CharacterProfile, LevelChange, NewCharacter, NewProfessionLevel,
    Profession, ProfessionLevel,
};
use crate::database::{from_row, from_rows, to_row, DataStore, Query, SortDirection, StoreError};
use crate::types::RowId;

/// Level every profession starts at for a new character
pub const STARTING_PROFESSION_LEVEL: i32 = 1;

#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Profession level must be at least {min}, got {got}")]
    InvalidLevel { min: i32, got: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Profession levels could not be seeded for a freshly inserted character.
    /// `compensated` tells whether the character row was removed again.
    #[error("Failed to seed profession levels for character {character_id}: {source}")]
    Seeding {
        character_id: RowId,
        source: StoreError,
        compensated: bool,
    },
}

/// Character composition: a character row joined with its profession levels.
#[derive(Clone)]
pub struct CharacterService {
    store: Arc<dyn DataStore>,
}

impl CharacterService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// The character owned by `user_id`, with one entry per profession level row.
    pub async fn profile_for_user(&self, user_id: RowId) -> Result<CharacterProfile, CharacterError> {
        let query = Query::all().eq("user_id", user_id).order_by("id", SortDirection::Asc).limit(1);
        let rows = self.store.select(tables::CHARACTERS, &query).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CharacterError::NotFound("Character".to_string()))?;
        let character: Character = from_row(row)?;

        let levels_query = Query::all()
            .eq("id_personaje", character.id)
            .order_by("id_oficio", SortDirection::Asc);
        let levels: Vec<ProfessionLevel> =
            from_rows(self.store.select(tables::PROFESSION_LEVELS, &levels_query).await?)?;

        let names = if levels.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<RowId> = levels.iter().map(|l| l.id_oficio).collect();
            let query = Query::all().columns(&["id", "nombre"]).in_list("id", ids);
            let professions: Vec<Profession> = from_rows(self.store.select(tables::PROFESSIONS, &query).await?)?;
            professions.into_iter().map(|p| (p.id, p.nombre)).collect()
        };

        Ok(CharacterProfile {
            character,
            oficios: join_levels(&levels, &names),
        })
    }

    /// Insert a character and give it every existing profession at level 1.
    ///
    /// The table service has no multi-request transaction, so this runs as a
    /// two-step saga: if seeding the levels fails, the character row (and any
    /// level rows that made it in) are deleted before the error is returned.
    pub async fn create(&self, new: NewCharacter) -> Result<CharacterProfile, CharacterError> {
        let inserted = self.store.insert(tables::CHARACTERS, vec![to_row(&new)?]).await?;
        let row = inserted
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no character row".to_string()))?;
        let character: Character = from_row(row)?;

        match self.seed_profession_levels(character.id).await {
            Ok(oficios) => {
                info!(
                    "Created character {} for user {} with {} profession(s)",
                    character.id,
                    character.user_id,
                    oficios.len()
                );
                Ok(CharacterProfile { character, oficios })
            }
            Err(source) => {
                warn!("Seeding professions for character {} failed, rolling back: {}", character.id, source);
                let compensated = self.compensate(character.id).await;
                Err(CharacterError::Seeding {
                    character_id: character.id,
                    source,
                    compensated,
                })
            }
        }
    }

    async fn seed_profession_levels(&self, character_id: RowId) -> Result<Vec<CharacterProfession>, StoreError> {
        let query = Query::all().columns(&["id", "nombre"]).order_by("id", SortDirection::Asc);
        let professions: Vec<Profession> = from_rows(self.store.select(tables::PROFESSIONS, &query).await?)?;

        if professions.is_empty() {
            return Ok(Vec::new());
        }

        let rows = professions
            .iter()
            .map(|p| {
                to_row(&NewProfessionLevel {
                    id_personaje: character_id,
                    id_oficio: p.id,
                    nivel: STARTING_PROFESSION_LEVEL,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let levels: Vec<ProfessionLevel> = from_rows(self.store.insert(tables::PROFESSION_LEVELS, rows).await?)?;
        let names = professions.into_iter().map(|p| (p.id, p.nombre)).collect();
        Ok(join_levels(&levels, &names))
    }

    /// Undo a partially created character. Returns whether the character row is gone.
    async fn compensate(&self, character_id: RowId) -> bool {
        let levels = Query::all().eq("id_personaje", character_id);
        if let Err(e) = self.store.delete(tables::PROFESSION_LEVELS, &levels).await {
            error!("Compensation: could not remove profession levels of character {}: {}", character_id, e);
        }

        match self.store.delete(tables::CHARACTERS, &Query::all().eq("id", character_id)).await {
            Ok(_) => true,
            Err(e) => {
                error!("Compensation: could not remove character {}: {}", character_id, e);
                false
            }
        }
    }

    /// Set the level of one (character, profession) pair.
    pub async fn set_profession_level(&self, change: LevelChange) -> Result<ProfessionLevel, CharacterError> {
        if change.nivel < STARTING_PROFESSION_LEVEL {
            return Err(CharacterError::InvalidLevel {
                min: STARTING_PROFESSION_LEVEL,
                got: change.nivel,
            });
        }

        let query = Query::all()
            .eq("id_personaje", change.id_personaje)
            .eq("id_oficio", change.id_oficio);

        let existing = self.store.select(tables::PROFESSION_LEVELS, &query.clone().limit(1)).await?;
        if existing.is_empty() {
            return Err(CharacterError::NotFound("Profession level".to_string()));
        }

        let mut changes = crate::database::Row::new();
        changes.insert("nivel".to_string(), change.nivel.into());
        let updated = self.store.update(tables::PROFESSION_LEVELS, &query, changes).await?;

        let row = updated
            .into_iter()
            .next()
            .ok_or_else(|| CharacterError::NotFound("Profession level".to_string()))?;
        Ok(from_row(row)?)
    }
}

fn join_levels(levels: &[ProfessionLevel], names: &HashMap<RowId, String>) -> Vec<CharacterProfession> {
    levels
        .iter()
        .map(|level| CharacterProfession {
            id_oficio: level.id_oficio,
            oficio: names.get(&level.id_oficio).cloned(),
            nivel: level.nivel,
        })
        .collect()
}
