//! Typed access to the todo records held in [`Db`].

use anyhow::Result;

use crate::db::Db;
use crate::models::{TodoInput, TodoItem};

pub struct TodoRepository<'a> {
    db: &'a Db,
}
impl<'a> TodoRepository<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    /// Persist a new item built from a validated full input.
    pub fn create(&self, input: TodoInput) -> Result<TodoItem> {
        // ids start at 1
        let id = self.db.next_id()? + 1;
        let mut todo = TodoItem::new(id, String::new(), false);
        input.apply(&mut todo, false);
        self.db.insert(TodoItem::key(id), &todo)?;
        Ok(todo)
    }

    pub fn get(&self, id: u64) -> Result<Option<TodoItem>> {
        self.db.get(TodoItem::key(id))
    }

    /// Apply `input` to an existing item. `None` if there is no such item.
    pub fn update(&self, id: u64, input: TodoInput, partial: bool) -> Result<Option<TodoItem>> {
        let key = TodoItem::key(id);
        let mut todo = match self.db.get::<TodoItem, _>(&key)? {
            Some(todo) => todo,
            None => return Ok(None),
        };
        input.apply(&mut todo, partial);
        self.db.insert(&key, &todo)?;
        Ok(Some(todo))
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.db.remove(TodoItem::key(id))
    }

    pub fn delete_all(&self) -> Result<usize> {
        self.db.remove_prefix(TodoItem::PREFIX)
    }

    /// All items in ascending id order.
    pub fn list(&self) -> Result<Vec<TodoItem>> {
        self.db
            .iter_prefix::<TodoItem>(TodoItem::PREFIX)?
            .map(|item| item.map(|(_, todo)| todo))
            .collect()
    }

    #[cfg(test)]
    pub fn count(&self) -> Result<usize> {
        Ok(self.db.iter_prefix::<TodoItem>(TodoItem::PREFIX)?.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, completed: Option<bool>) -> TodoInput {
        TodoInput {
            title: Some(title.to_string()),
            completed,
        }
    }

    #[test]
    fn test_create_defaults_completed() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        let todo = repo.create(input("Walk The Dog", None))?;
        assert_eq!(todo.title, "Walk The Dog");
        assert!(!todo.completed);
        assert_eq!(repo.get(todo.id)?, Some(todo));
        assert_eq!(repo.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_ids_are_unique_and_ordered() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        let ids = (0..12)
            .map(|n| repo.create(input(&format!("item {n}"), None)).map(|t| t.id))
            .collect::<Result<Vec<_>>>()?;
        assert!(ids.iter().all(|id| *id >= 1));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let listed: Vec<u64> = repo.list()?.into_iter().map(|t| t.id).collect();
        assert_eq!(listed, ids);
        Ok(())
    }

    #[test]
    fn test_ids_not_reused_after_delete() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        let first = repo.create(input("a", None))?;
        assert!(repo.delete(first.id)?);
        let second = repo.create(input("b", None))?;
        assert_ne!(first.id, second.id);
        Ok(())
    }

    #[test]
    fn test_ids_survive_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = {
            let db = Db::open(dir.path())?;
            let todo = TodoRepository::new(&db).create(input("a", None))?;
            db.flush()?;
            todo
        };
        let db = Db::open(dir.path())?;
        let repo = TodoRepository::new(&db);
        let second = repo.create(input("b", None))?;
        assert!(second.id > first.id);
        assert_eq!(repo.count()?, 2);
        Ok(())
    }

    #[test]
    fn test_update_missing_is_none() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        assert!(repo.update(42, input("x", Some(true)), false)?.is_none());
        assert!(repo.update(42, TodoInput::default(), true)?.is_none());
        assert_eq!(repo.count()?, 0);
        Ok(())
    }

    #[test]
    fn test_partial_update() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        let todo = repo.create(input("Walk The Dog", None))?;
        let patch = TodoInput {
            title: None,
            completed: Some(true),
        };
        let updated = repo.update(todo.id, patch, true)?.unwrap();
        assert_eq!(updated.title, "Walk The Dog");
        assert!(updated.completed);
        assert_eq!(repo.get(todo.id)?, Some(updated));
        Ok(())
    }

    #[test]
    fn test_delete_all() -> Result<()> {
        let db = Db::temporary()?;
        let repo = TodoRepository::new(&db);
        assert_eq!(repo.delete_all()?, 0);
        repo.create(input("a", None))?;
        repo.create(input("b", Some(true)))?;
        assert_eq!(repo.delete_all()?, 2);
        assert!(repo.list()?.is_empty());
        Ok(())
    }
}
