//! Placement of projects on the priority × urgency matrix.
//!
//! Coordinates are percentages of the canvas. Priority picks one of four
//! horizontal bands on y; days until the target date pick one of fifteen
//! day columns on x. Both directions are pure so a drop can be turned back
//! into a priority and a date.

use chrono::{Duration, NaiveDate};

use crate::entity::{
    PriorityLevel, ProjectPatch, ProjectType, StrategicCategory, StudioProject,
};

/// Band centres on y, top to bottom.
const BAND_CENTRES: [(PriorityLevel, f64); 4] = [
    (PriorityLevel::Urgent, 12.5),
    (PriorityLevel::High, 37.5),
    (PriorityLevel::Mid, 62.5),
    (PriorityLevel::Low, 87.5),
];

/// Left edge of the day grid.
pub const X_START: f64 = 16.0;
/// Width of the day grid.
pub const X_SPAN: f64 = 68.0;
/// Last day column, counted from today.
pub const HORIZON_DAYS: i64 = 14;
/// Where undated projects sit.
pub const NO_DATE_X: f64 = 92.0;
/// Anything right of this means "no date".
pub const NO_DATE_THRESHOLD: f64 = 86.0;

const DRAG_X: (f64, f64) = (X_START, X_START + X_SPAN);
const DRAG_Y: (f64, f64) = (15.0, 85.0);

/// Days before today still shown on the matrix.
const WINDOW_PAST_DAYS: i64 = 1;
/// Days after today still shown on the matrix.
const WINDOW_FUTURE_DAYS: i64 = 15;

/// Missing priorities fall into the lowest band.
pub fn y_from_priority(priority: Option<PriorityLevel>) -> f64 {
    let priority = priority.unwrap_or(PriorityLevel::Low);
    BAND_CENTRES
        .iter()
        .find(|(level, _)| *level == priority)
        .map(|(_, y)| *y)
        .unwrap_or(87.5)
}

pub fn priority_from_y(y: f64) -> PriorityLevel {
    if y < 25.0 {
        PriorityLevel::Urgent
    } else if y < 50.0 {
        PriorityLevel::High
    } else if y < 75.0 {
        PriorityLevel::Mid
    } else {
        PriorityLevel::Low
    }
}

/// Overdue dates clamp to today's column, far dates to the last one.
pub fn x_from_date(target: Option<NaiveDate>, today: NaiveDate) -> f64 {
    match target {
        None => NO_DATE_X,
        Some(date) => {
            let days = (date - today).num_days().clamp(0, HORIZON_DAYS);
            column_x(days)
        }
    }
}

pub fn date_from_x(x: f64, today: NaiveDate) -> Option<NaiveDate> {
    if x > NO_DATE_THRESHOLD {
        return None;
    }
    let fraction = ((x - X_START) / X_SPAN).max(0.0);
    let days = (fraction * HORIZON_DAYS as f64).round() as i64;
    if days > HORIZON_DAYS {
        return None;
    }
    Some(today + Duration::days(days))
}

/// Day column under `x` while dragging.
pub fn day_slot(x: f64) -> i64 {
    let x = x.clamp(DRAG_X.0, DRAG_X.1);
    ((x - X_START) / X_SPAN * HORIZON_DAYS as f64).round() as i64
}

fn column_x(days: i64) -> f64 {
    X_START + (days as f64 / HORIZON_DAYS as f64) * X_SPAN
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Where a project is drawn. A persisted drag position wins over the
/// position derived from its priority and date.
pub fn position_of(project: &StudioProject, today: NaiveDate) -> Position {
    Position {
        x: project
            .ai_position_x
            .unwrap_or_else(|| x_from_date(project.target_date, today)),
        y: project
            .ai_position_y
            .unwrap_or_else(|| y_from_priority(project.priority)),
    }
}

/// Undated projects, and those due between yesterday and about two weeks
/// out.
pub fn in_window(project: &StudioProject, today: NaiveDate) -> bool {
    match project.target_date {
        None => true,
        Some(date) => {
            let days = (date - today).num_days();
            (-WINDOW_PAST_DAYS..=WINDOW_FUTURE_DAYS).contains(&days)
        }
    }
}

/// Which projects the matrix shows, beyond the archive and date window.
#[derive(Debug, Clone, Default)]
pub struct MatrixFilter {
    pub category: Option<StrategicCategory>,
    pub project_type: Option<ProjectType>,
    /// Case-insensitive match against title or tagline.
    pub search: Option<String>,
}

impl MatrixFilter {
    pub fn matches(&self, project: &StudioProject) -> bool {
        if self
            .category
            .is_some_and(|c| project.strategic_category != Some(c))
        {
            return false;
        }
        if self
            .project_type
            .is_some_and(|t| project.project_type != Some(t))
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                project.title.to_lowercase().contains(&query)
                    || project
                        .tagline
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
            }
        }
    }
}

/// Projects the matrix shows: not archived, inside the window, and passing
/// `filter`.
pub fn visible<'a>(
    projects: &'a [StudioProject],
    today: NaiveDate,
    filter: &MatrixFilter,
) -> Vec<&'a StudioProject> {
    projects
        .iter()
        .filter(|p| !p.is_archived)
        .filter(|p| filter.matches(p))
        .filter(|p| in_window(p, today))
        .collect()
}

/// A finished drag, already clamped and snapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixDrop {
    pub priority: PriorityLevel,
    pub target_date: Option<NaiveDate>,
    pub x: f64,
    pub y: f64,
}

impl MatrixDrop {
    /// Clamp a raw drop point to the canvas and snap x to its day column.
    pub fn at(x: f64, y: f64, today: NaiveDate) -> Self {
        let y = y.clamp(DRAG_Y.0, DRAG_Y.1);
        let x = column_x(day_slot(x));
        Self {
            priority: priority_from_y(y),
            target_date: date_from_x(x, today),
            x,
            y,
        }
    }

    /// The update persisting this drop, raw coordinates included.
    pub fn into_patch(self) -> ProjectPatch {
        ProjectPatch {
            priority: Some(Some(self.priority)),
            target_date: Some(self.target_date),
            ai_position_x: Some(Some(self.x)),
            ai_position_y: Some(Some(self.y)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NewProject, Record};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn project(target_date: Option<NaiveDate>, priority: Option<PriorityLevel>) -> StudioProject {
        let draft = NewProject {
            title: "Pavilion".to_string(),
            target_date,
            priority,
            ..Default::default()
        };
        StudioProject::materialize(&draft, "p-1".to_string(), Utc::now()).unwrap()
    }

    #[test]
    fn test_priority_round_trip() {
        for level in PriorityLevel::ALL {
            assert_eq!(priority_from_y(y_from_priority(Some(*level))), *level);
        }
    }

    #[test]
    fn test_date_round_trip_over_grid() {
        for days in 0..=HORIZON_DAYS {
            let date = today() + Duration::days(days);
            assert_eq!(date_from_x(x_from_date(Some(date), today()), today()), Some(date));
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(priority_from_y(0.0), PriorityLevel::Urgent);
        assert_eq!(priority_from_y(24.9), PriorityLevel::Urgent);
        assert_eq!(priority_from_y(25.0), PriorityLevel::High);
        assert_eq!(priority_from_y(50.0), PriorityLevel::Mid);
        assert_eq!(priority_from_y(75.0), PriorityLevel::Low);
        assert_eq!(y_from_priority(None), 87.5);
    }

    #[test]
    fn test_x_from_date_clamps() {
        assert_eq!(x_from_date(None, today()), NO_DATE_X);
        assert_eq!(x_from_date(Some(today() - Duration::days(5)), today()), X_START);
        assert_eq!(
            x_from_date(Some(today() + Duration::days(40)), today()),
            X_START + X_SPAN
        );
        assert_eq!(x_from_date(Some(today() + Duration::days(7)), today()), 50.0);
    }

    #[test]
    fn test_date_from_x_edges() {
        assert_eq!(date_from_x(NO_DATE_X, today()), None);
        assert_eq!(date_from_x(86.5, today()), None);
        assert_eq!(date_from_x(86.0, today()), Some(today() + Duration::days(14)));
        assert_eq!(date_from_x(2.0, today()), Some(today()));
    }

    #[test]
    fn test_drop_clamps_and_snaps() {
        let drop = MatrixDrop::at(97.0, 3.0, today());
        assert_eq!(drop.x, X_START + X_SPAN);
        assert_eq!(drop.y, 15.0);
        assert_eq!(drop.priority, PriorityLevel::Urgent);
        assert_eq!(drop.target_date, Some(today() + Duration::days(HORIZON_DAYS)));

        let drop = MatrixDrop::at(51.0, 60.0, today());
        assert_eq!(drop.x, 50.0);
        assert_eq!(drop.priority, PriorityLevel::Mid);
        assert_eq!(drop.target_date, Some(today() + Duration::days(7)));
    }

    #[test]
    fn test_drop_patch_persists_coordinates() {
        let patch = MatrixDrop::at(30.0, 40.0, today()).into_patch();
        assert_eq!(patch.priority, Some(Some(PriorityLevel::High)));
        assert_eq!(patch.target_date, Some(Some(today() + Duration::days(3))));
        assert_eq!(patch.ai_position_x, Some(Some(X_START + 3.0 / 14.0 * X_SPAN)));
        assert_eq!(patch.ai_position_y, Some(Some(40.0)));
    }

    #[test]
    fn test_day_slot() {
        assert_eq!(day_slot(0.0), 0);
        assert_eq!(day_slot(50.0), 7);
        assert_eq!(day_slot(100.0), HORIZON_DAYS);
    }

    #[test]
    fn test_position_prefers_persisted_coordinates() {
        let mut p = project(Some(today() + Duration::days(7)), Some(PriorityLevel::High));
        assert_eq!(position_of(&p, today()), Position { x: 50.0, y: 37.5 });

        p.ai_position_x = Some(33.0);
        p.ai_position_y = Some(71.0);
        assert_eq!(position_of(&p, today()), Position { x: 33.0, y: 71.0 });
    }

    #[test]
    fn test_window_and_visibility() {
        let undated = project(None, None);
        let yesterday = project(Some(today() - Duration::days(1)), None);
        let overdue = project(Some(today() - Duration::days(2)), None);
        let far = project(Some(today() + Duration::days(16)), None);
        assert!(in_window(&undated, today()));
        assert!(in_window(&yesterday, today()));
        assert!(!in_window(&overdue, today()));
        assert!(!in_window(&far, today()));

        let mut archived = project(None, None);
        archived.is_archived = true;
        let mut media = project(None, None);
        media.strategic_category = Some(StrategicCategory::Media);

        let all = vec![undated, overdue, archived, media];
        assert_eq!(visible(&all, today(), &MatrixFilter::default()).len(), 2);
        let media_filter = MatrixFilter {
            category: Some(StrategicCategory::Media),
            ..Default::default()
        };
        let only_media = visible(&all, today(), &media_filter);
        assert_eq!(only_media.len(), 1);
        assert_eq!(only_media[0].strategic_category, Some(StrategicCategory::Media));
    }

    #[test]
    fn test_filter_by_search_and_type() {
        let mut pavilion = project(None, None);
        pavilion.title = "Riverside Pavilion".to_string();
        pavilion.project_type = Some(ProjectType::ArchitecturalDesign);
        let mut lamp = project(None, None);
        lamp.title = "Desk lamp".to_string();
        lamp.tagline = Some("A PAVILION of light".to_string());
        lamp.project_type = Some(ProjectType::ProductDesign);
        let mut untyped = project(None, None);
        untyped.title = "Zine".to_string();
        let all = vec![pavilion, lamp, untyped];

        let search = MatrixFilter {
            search: Some("  pavilion ".to_string()),
            ..Default::default()
        };
        let titles: Vec<_> = visible(&all, today(), &search)
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Riverside Pavilion", "Desk lamp"]);

        let typed = MatrixFilter {
            search: Some("pavilion".to_string()),
            project_type: Some(ProjectType::ProductDesign),
            ..Default::default()
        };
        let found = visible(&all, today(), &typed);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Desk lamp");

        let blank = MatrixFilter {
            search: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(visible(&all, today(), &blank).len(), 3);
    }
}
