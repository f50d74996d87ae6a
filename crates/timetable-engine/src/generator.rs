//! Schedule generation -- expands templates into dated occurrences and persists them.
//!
//! A template fires on exactly one weekday, so expansion jumps to the first
//! matching date in the range and then steps a week at a time. The range end
//! is exclusive.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, info, warn};

use crate::config::{ConflictPolicy, GeneratorConfig};
use crate::error::{Result, ScheduleError};
use crate::model::{DayScheduleTemplate, NewOccurrence, OccurrenceId};
use crate::store::{OccurrenceQuery, OccurrenceStore};
use crate::validator;

/// Outcome of a successful [`ScheduleGenerator::generate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Ids of the saved occurrences, in save order.
    pub saved: Vec<OccurrenceId>,
    /// Number of occurrences saved for each template, in input order.
    pub per_template: Vec<usize>,
}

impl GenerationReport {
    pub fn total(&self) -> usize {
        self.saved.len()
    }
}

/// First date on or after `start` falling on `weekday`. `None` past the end
/// of the representable calendar.
fn first_on_or_after(start: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let offset = (7 + weekday.num_days_from_monday() - start.weekday().num_days_from_monday()) % 7;
    start.checked_add_days(Days::new(offset as u64))
}

/// Dates in `start..end` on which `template` takes place, in increasing order.
fn template_dates<'a>(
    start: NaiveDate,
    end: NaiveDate,
    template: &DayScheduleTemplate,
    excluded_dates: &'a [NaiveDate],
) -> impl Iterator<Item = NaiveDate> + 'a {
    std::iter::successors(first_on_or_after(start, template.weekday), |date| {
        date.checked_add_days(Days::new(7))
    })
    .take_while(move |date| *date < end)
    .filter(move |date| !excluded_dates.contains(date))
}

/// Expand templates over `start..end` without persisting anything.
///
/// Templates are processed in input order; each template's dates are strictly
/// increasing. Dates listed in `excluded_dates` are skipped. An empty or
/// inverted range yields no occurrences.
pub fn expand(
    start: NaiveDate,
    end: NaiveDate,
    templates: &[DayScheduleTemplate],
    excluded_dates: &[NaiveDate],
) -> Vec<NewOccurrence> {
    templates
        .iter()
        .flat_map(|template| {
            template_dates(start, end, template, excluded_dates)
                .map(move |date| template.occurrence_on(date))
        })
        .collect()
}

/// Validates templates and writes their occurrences into an [`OccurrenceStore`].
#[derive(Debug, Clone)]
pub struct ScheduleGenerator<S> {
    store: S,
    config: GeneratorConfig,
}

impl<S: OccurrenceStore> ScheduleGenerator<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, GeneratorConfig::default())
    }

    pub fn with_config(store: S, config: GeneratorConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate `templates` and persist one occurrence per template and
    /// matching date in `start..end`.
    ///
    /// # Errors
    /// - Validation errors ([`ScheduleError::InvalidRange`],
    ///   [`ScheduleError::EmptyGroupSet`], [`ScheduleError::Conflict`]) before
    ///   any store call.
    /// - [`ScheduleError::StoreConflict`] under [`ConflictPolicy::CheckStore`]
    ///   when an earlier booking collides, before any write.
    /// - [`ScheduleError::Persistence`] on the first store failure. Occurrences
    ///   saved before it are not rolled back.
    pub fn generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        templates: &[DayScheduleTemplate],
    ) -> Result<GenerationReport> {
        if let Err(e) = validator::validate(start, end, templates) {
            warn!(%start, %end, error = %e, "schedule rejected by validation");
            return Err(e);
        }

        let excluded = &self.config.excluded_dates;
        let planned: Vec<(usize, NewOccurrence)> = templates
            .iter()
            .enumerate()
            .flat_map(|(index, template)| {
                template_dates(start, end, template, excluded)
                    .map(move |date| (index, template.occurrence_on(date)))
            })
            .collect();

        if self.config.conflict_policy == ConflictPolicy::CheckStore {
            self.check_store(&planned)?;
        }

        let mut report = GenerationReport {
            saved: Vec::with_capacity(planned.len()),
            per_template: vec![0; templates.len()],
        };

        for (index, occurrence) in planned {
            let date = occurrence.date;
            match self.store.save(occurrence) {
                Ok(id) => {
                    debug!(template = index, %date, occurrence = %id, "saved occurrence");
                    report.saved.push(id);
                    report.per_template[index] += 1;
                }
                Err(source) => {
                    warn!(
                        template = index,
                        %date,
                        saved = report.saved.len(),
                        error = %source,
                        "aborting generation on store failure"
                    );
                    return Err(ScheduleError::Persistence {
                        saved: report.saved.len(),
                        source,
                    });
                }
            }
        }

        info!(
            %start,
            %end,
            templates = templates.len(),
            occurrences = report.total(),
            "schedule generated"
        );
        Ok(report)
    }

    fn check_store(&self, planned: &[(usize, NewOccurrence)]) -> Result<()> {
        for (_, occurrence) in planned {
            let query = OccurrenceQuery::on(occurrence.date).time_slot(occurrence.time_slot.id);
            let existing = self
                .store
                .find(&query)
                .map_err(|source| ScheduleError::Persistence { saved: 0, source })?;

            if let Some(clash) = existing
                .iter()
                .find(|e| e.shares_resource_with(occurrence))
            {
                warn!(
                    date = %occurrence.date,
                    time_slot = %occurrence.time_slot.id,
                    existing = %clash.id,
                    "planned occurrence collides with stored booking"
                );
                return Err(ScheduleError::StoreConflict {
                    date: occurrence.date,
                    time_slot: occurrence.time_slot.id,
                    existing: clash.id,
                });
            }
        }
        Ok(())
    }
}
