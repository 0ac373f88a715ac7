use lookup::Candidate;
use scene::{AggregateCounts, Entity, Presentation};
use session::SessionEvent;

/// Running summary of what the session reported, for `status` and the
/// option listings.
#[derive(Debug, Default)]
pub struct Summary {
    entities: usize,
    counts: AggregateCounts,
    shown: usize,
    total_matches: usize,
    selected: Option<Entity>,
    presentation: Option<Presentation>,
    candidates: Vec<Candidate>,
}

impl Summary {
    pub fn record(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::DatasetLoaded { entities, counts } => {
                self.entities = *entities;
                self.counts = counts.clone();
            }
            SessionEvent::SubsetChanged {
                shown,
                total_matches,
                ..
            } => {
                self.shown = *shown;
                self.total_matches = *total_matches;
            }
            SessionEvent::CandidatesChanged(candidates) => self.candidates = candidates.clone(),
            SessionEvent::SelectionChanged {
                entity,
                presentation,
            } => {
                self.selected = entity.clone();
                self.presentation = Some(*presentation);
            }
            _ => {}
        }
    }

    pub fn render(&self) -> String {
        let selection = match (&self.selected, self.presentation) {
            (Some(entity), Some(p)) => format!("tree {} ({p:?})", entity.id),
            _ => "none".to_string(),
        };
        format!(
            "trees: {}\noverlay: {} of {} matches\nselection: {selection}\ncandidates: {}",
            self.entities,
            self.shown,
            self.total_matches,
            self.candidates.len()
        )
    }

    pub fn render_species(&self) -> String {
        render_options("species", self.counts.categories())
    }

    pub fn render_neighborhoods(&self) -> String {
        render_options("neighborhoods", self.counts.groups())
    }
}

fn render_options<'a>(title: &str, options: impl Iterator<Item = (&'a str, usize)>) -> String {
    let mut out = String::new();
    for (name, count) in options {
        out.push_str(&format!("\n  {name} ({count})"));
    }
    if out.is_empty() {
        format!("no {title} loaded")
    } else {
        format!("{title}:{out}")
    }
}

/// Detail panel text: species, neighborhood, then properties in file order.
fn render_entity(entity: &Entity) -> String {
    let species = if entity.category.is_empty() {
        "unknown"
    } else {
        entity.category.as_str()
    };
    let mut out = format!("  species: {species}");
    if let Some(group) = &entity.group {
        out.push_str(&format!("\n  neighborhood: {group}"));
    }
    for (key, value) in &entity.properties.pairs {
        if value.is_empty() {
            continue;
        }
        let label = match key.as_str() {
            "plantDate" => "plant date",
            "siteInfo" => "site info",
            "legalStatus" => "legal status",
            "neighborhood" => "neighborhood code",
            other => other,
        };
        out.push_str(&format!("\n  {label}: {value}"));
    }
    out
}

pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::DatasetLoaded { entities, .. } => format!("loaded {entities} trees"),
        SessionEvent::Notice(message) => format!("notice: {message}"),
        SessionEvent::SubsetChanged {
            shown,
            total_matches,
            overlay_visible,
        } => {
            let visibility = if *overlay_visible { "shown" } else { "hidden" };
            format!("overlay {visibility}: {shown} of {total_matches} matches")
        }
        SessionEvent::CandidatesChanged(candidates) if candidates.is_empty() => {
            "no address candidates".to_string()
        }
        SessionEvent::CandidatesChanged(candidates) => {
            let mut out = String::from("address candidates:");
            for (i, c) in candidates.iter().enumerate() {
                out.push_str(&format!("\n  {}. {}", i + 1, c.label));
            }
            out
        }
        SessionEvent::CandidateChosen(c) => format!(
            "moved to {} ({:.5}, {:.5})",
            c.label, c.position.lat, c.position.lon
        ),
        SessionEvent::SelectionChanged {
            entity: Some(entity),
            presentation,
        } => format!(
            "selected tree {}: panel {presentation:?}\n{}",
            entity.id,
            render_entity(entity)
        ),
        SessionEvent::SelectionChanged { entity: None, .. } => "selection cleared".to_string(),
        SessionEvent::Located(p) => format!("you are at {:.5}, {:.5}", p.lat, p.lon),
        SessionEvent::LocationFailed(err) => format!("location error: {err}"),
    }
}
