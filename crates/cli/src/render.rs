use careerscout_storage::{Schedule, StoredVacancy};

pub fn vacancy(v: &StoredVacancy) -> String {
    format!(
        "Компания: {}\nВакансия: {}\nМестоположение: {}\nЗарплата: {}\nСкиллы: {}\nСсылка: {}\n",
        v.company, v.title, v.location, v.salary, v.skills, v.link
    )
}

/// Cards separated by blank lines, or `empty` when there are none.
pub fn vacancies(rows: &[StoredVacancy], heading: Option<&str>, empty: &str) -> String {
    if rows.is_empty() {
        return empty.to_string();
    }
    let body = rows.iter().map(vacancy).collect::<Vec<_>>().join("\n");
    match heading {
        Some(heading) => format!("{}\n\n{}", heading, body),
        None => body,
    }
}

pub fn total(count: i64) -> String {
    format!("Всего вакансий в базе данных: {}", count)
}

pub fn schedule_count(schedule: Schedule, count: i64) -> String {
    let label = match schedule {
        Schedule::PartTime => Schedule::PART_TIME_MARKER,
        Schedule::FullTime => Schedule::FULL_TIME_MARKER,
    };
    format!("Вакансий с графиком \"{}\": {}", label, count)
}
