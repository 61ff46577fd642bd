use crate::calendar::todos_due_on;
use crate::model::{TodoItem, TodoList};
use crate::storage::{load_todos, save_todos, FileStore};
use crate::ui;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;

pub fn add(text: String, due: Option<String>) -> Result<()> {
    let due_date = parse_due(due.as_deref())?;
    let (mut todos, mut store) = load_current_todos()?;
    match todos.add(&text, due_date) {
        Some(id) => {
            save_todos(&mut store, &todos)?;
            match due_date {
                Some(date) => println!("Added todo {} (due {})", id, format_due(date)),
                None => println!("Added todo {}", id),
            }
        }
        None => println!("Nothing to add: todo text is empty"),
    }
    Ok(())
}

pub fn list(due: Option<String>) -> Result<()> {
    let filter = parse_due(due.as_deref())?;
    let (todos, store) = load_current_todos()?;
    println!("Todos ({})", store.dir().display());
    let items: Vec<&TodoItem> = match filter {
        Some(date) => todos_due_on(todos.items(), date),
        None => todos.items().iter().collect(),
    };
    if items.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for item in items {
        print_todo(item);
    }
    Ok(())
}

pub fn toggle(id: i64) -> Result<()> {
    let (mut todos, mut store) = load_current_todos()?;
    if todos.toggle(id) {
        save_todos(&mut store, &todos)?;
        let state = if todos.get(id).map(|t| t.completed).unwrap_or(false) {
            "done"
        } else {
            "pending"
        };
        println!("Todo {} is now {}", id, state);
    } else {
        println!("No todo with id {}", id);
    }
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (mut todos, mut store) = load_current_todos()?;
    if todos.delete(id) {
        save_todos(&mut store, &todos)?;
        println!("Deleted todo {}", id);
    } else {
        println!("No todo with id {}", id);
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    let (todos, store) = load_current_todos()?;
    ui::run(todos, store)
}

fn load_current_todos() -> Result<(TodoList, FileStore)> {
    let store = FileStore::open_default()?;
    let todos = load_todos(&store);
    Ok((todos, store))
}

fn parse_due(input: Option<&str>) -> Result<Option<NaiveDate>> {
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))?;
    Ok(Some(date))
}

fn format_due(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn print_todo(item: &TodoItem) {
    let mark = if item.completed { "x" } else { " " };
    match item.due_date {
        Some(date) => println!("  [{}] {} {} (due {})", mark, item.id, item.text, format_due(date)),
        None => println!("  [{}] {} {}", mark, item.id, item.text),
    }
}
