use crate::model::TodoItem;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Self {
        CalendarMonth { year, month }
    }

    pub fn containing(date: NaiveDate) -> Self {
        CalendarMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            CalendarMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            CalendarMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            CalendarMonth {
                year: self.year - 1,
                month: 12,
            }
        } else {
            CalendarMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.first_day().format("%B"), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub todo_count: usize,
    pub is_selected: bool,
    pub is_today: bool,
}

impl DayCell {
    pub fn has_todos(&self) -> bool {
        self.todo_count > 0
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = CalendarMonth::new(year, month).first_day();
    CalendarMonth::new(year, month)
        .next()
        .first_day()
        .pred_opt()
        .unwrap_or(first)
        .day()
}

pub fn first_weekday_of_month(year: i32, month: u32) -> u32 {
    CalendarMonth::new(year, month)
        .first_day()
        .weekday()
        .num_days_from_sunday()
}

pub fn todos_due_on(todos: &[TodoItem], date: NaiveDate) -> Vec<&TodoItem> {
    todos
        .iter()
        .filter(|todo| todo.due_date == Some(date))
        .collect()
}

// Sunday-first flat grid: leading None cells pad the first week so day 1
// lands under its weekday column.
pub fn month_cells(
    month: CalendarMonth,
    selected: NaiveDate,
    today: NaiveDate,
    todos: &[TodoItem],
) -> Vec<Option<DayCell>> {
    let pad = first_weekday_of_month(month.year(), month.month());
    let days = days_in_month(month.year(), month.month());
    let mut cells = Vec::with_capacity((pad + days) as usize);
    for _ in 0..pad {
        cells.push(None);
    }
    for day in 1..=days {
        if let Some(date) = month.day(day) {
            cells.push(Some(DayCell {
                date,
                todo_count: todos_due_on(todos, date).len(),
                is_selected: date == selected,
                is_today: date == today,
            }));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TodoList;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn month_lengths_respect_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn first_weekday_counts_from_sunday() {
        // 2023-10-01 was a Sunday, 2024-03-01 a Friday.
        assert_eq!(first_weekday_of_month(2023, 10), 0);
        assert_eq!(first_weekday_of_month(2024, 3), 5);
    }

    #[test]
    fn navigation_wraps_year_boundaries() {
        assert_eq!(
            CalendarMonth::new(2023, 12).next(),
            CalendarMonth::new(2024, 1)
        );
        assert_eq!(
            CalendarMonth::new(2024, 1).previous(),
            CalendarMonth::new(2023, 12)
        );
    }

    #[test]
    fn twelve_steps_forward_and_back_return_home() {
        let start = CalendarMonth::new(2024, 6);
        let mut month = start;
        for _ in 0..12 {
            month = month.next();
        }
        assert_eq!(month, CalendarMonth::new(2025, 6));
        for _ in 0..12 {
            month = month.previous();
        }
        assert_eq!(month, start);
    }

    #[test]
    fn grouping_matches_calendar_day_only() {
        let mut todos = TodoList::default();
        let milk = todos.add("Buy milk", Some(date(2024, 3, 15))).expect("added");
        todos.add("Other day", Some(date(2024, 3, 16))).expect("added");
        todos.add("Undated", None).expect("added");

        let due = todos_due_on(todos.items(), date(2024, 3, 15));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, milk);
        assert_eq!(due[0].text, "Buy milk");
    }

    #[test]
    fn march_2024_grid_marks_the_milk_run() {
        let mut todos = TodoList::default();
        todos.add("Buy milk", Some(date(2024, 3, 15))).expect("added");

        let cells = month_cells(
            CalendarMonth::new(2024, 3),
            date(2024, 3, 10),
            date(2024, 3, 1),
            todos.items(),
        );
        // Five leading pads (March 2024 starts on a Friday), then 31 days.
        assert_eq!(cells.len(), 5 + 31);
        assert!(cells[..5].iter().all(|cell| cell.is_none()));

        let day15 = cells[5 + 14].expect("day 15 present");
        assert_eq!(day15.date, date(2024, 3, 15));
        assert!(day15.has_todos());
        assert_eq!(day15.todo_count, 1);

        let marked: Vec<u32> = cells
            .iter()
            .flatten()
            .filter(|cell| cell.has_todos())
            .map(|cell| cell.date.day())
            .collect();
        assert_eq!(marked, vec![15]);
    }

    #[test]
    fn selected_and_today_flags_are_independent() {
        let todos = TodoList::default();
        let cells = month_cells(
            CalendarMonth::new(2024, 3),
            date(2024, 3, 10),
            date(2024, 3, 10),
            todos.items(),
        );
        let both = cells[5 + 9].expect("day 10 present");
        assert!(both.is_selected && both.is_today);

        let cells = month_cells(
            CalendarMonth::new(2024, 3),
            date(2024, 3, 10),
            date(2024, 3, 12),
            todos.items(),
        );
        let selected = cells[5 + 9].expect("day 10 present");
        assert!(selected.is_selected && !selected.is_today);
        let today = cells[5 + 11].expect("day 12 present");
        assert!(!today.is_selected && today.is_today);
    }

    #[test]
    fn selection_outside_displayed_month_marks_nothing() {
        let todos = TodoList::default();
        let cells = month_cells(
            CalendarMonth::new(2024, 4),
            date(2024, 3, 10),
            date(2024, 3, 10),
            todos.items(),
        );
        assert!(cells
            .iter()
            .flatten()
            .all(|cell| !cell.is_selected && !cell.is_today));
    }
}
