//! Row production for each report type.
//!
//! A producer reads the restricted rows of one volume and writes them to
//! one staged file per group. Groups are opened lazily and emitted in
//! ascending key order, so a grouped report over a volume without rows
//! stages nothing, while an ungrouped one stages a file with only its title.

mod annotations;
mod image_labels;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::error::ReportError;
use crate::model::{User, UserId, Volume};
use crate::query::{group_titles, GroupKey};
use crate::restriction::{ExportAreaFilter, Grouping, Restrictions};
use crate::store::AnnotationStore;

use super::registry::ReportType;
use super::staged::{StagedTabularWriter, Staging};

/// Everything a producer needs besides the volume it reports on.
pub(crate) struct Job<'a> {
    pub store: &'a dyn AnnotationStore,
    pub restrictions: &'a Restrictions,
    pub export_area: ExportAreaFilter,
    /// Volume name shown in the title rows of a project report.
    pub title_prefix: Option<&'a str>,
}

/// Writes the staged files of `report_type` for one volume.
pub(crate) fn produce(
    report_type: ReportType,
    job: &Job<'_>,
    volume: &Volume,
    staging: &mut Staging,
) -> Result<(), ReportError> {
    match report_type {
        ReportType::AnnotationsBasic => annotations::basic(job, volume, staging),
        ReportType::AnnotationsExtended => annotations::extended(job, volume, staging),
        ReportType::AnnotationsFull => annotations::full(job, volume, staging),
        ReportType::AnnotationsCsv => annotations::csv(job, volume, staging),
        ReportType::ImageLabelsBasic => image_labels::basic(job, volume, staging),
        ReportType::ImageLabelsCsv => image_labels::csv(job, volume, staging),
        ReportType::ImageLabelsLocation => image_labels::location(job, volume, staging),
    }
}

/// Title row of a staged file.
pub(crate) fn title(prefix: Option<&str>, group: Option<&str>) -> String {
    match (prefix, group) {
        (None, None) => String::new(),
        (Some(volume), None) => volume.to_string(),
        (None, Some(group)) => group.to_string(),
        (Some(volume), Some(group)) => format!("{} ({})", volume, group),
    }
}

/// One staged writer per group, opened on first use.
struct GroupedWriters<'a> {
    job: &'a Job<'a>,
    dir: PathBuf,
    grouping: Grouping,
    header: Option<&'static [&'static str]>,
    writers: BTreeMap<Option<GroupKey>, StagedTabularWriter>,
}

impl<'a> GroupedWriters<'a> {
    fn new(job: &'a Job<'a>, staging: &Staging, header: Option<&'static [&'static str]>) -> Self {
        Self {
            job,
            dir: staging.dir().to_path_buf(),
            grouping: job.restrictions.grouping(),
            header,
            writers: BTreeMap::new(),
        }
    }

    fn writer(&mut self, key: Option<GroupKey>) -> Result<&mut StagedTabularWriter, ReportError> {
        match self.writers.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let group = match &key {
                    Some(key) => group_titles(self.job.store, [key])?.remove(key),
                    None => None,
                };
                let mut writer = StagedTabularWriter::open(&self.dir)?;
                writer.write_row([title(self.job.title_prefix, group.as_deref())])?;
                if let Some(header) = self.header {
                    writer.write_row(header)?;
                }
                Ok(entry.insert(writer))
            }
        }
    }

    /// Closes every writer in group order and stages the files. An
    /// ungrouped report always gets its file, even without rows.
    fn finish(mut self, staging: &mut Staging) -> Result<(), ReportError> {
        if self.grouping == Grouping::None && self.writers.is_empty() {
            self.writer(None)?;
        }
        for writer in self.writers.into_values() {
            staging.push(writer.close()?);
        }
        Ok(())
    }
}

/// Users read through the store once each.
struct UserCache<'a> {
    store: &'a dyn AnnotationStore,
    users: HashMap<UserId, Option<User>>,
}

impl<'a> UserCache<'a> {
    fn new(store: &'a dyn AnnotationStore) -> Self {
        Self {
            store,
            users: HashMap::new(),
        }
    }

    /// First and last name of the user, empty if unknown.
    fn names(&mut self, id: UserId) -> Result<(String, String), ReportError> {
        if !self.users.contains_key(&id) {
            let user = self.store.users(&[id])?.into_iter().next();
            self.users.insert(id, user);
        }
        Ok(match self.users.get(&id).and_then(Option::as_ref) {
            Some(user) => (user.firstname.clone(), user.lastname.clone()),
            None => (String::new(), String::new()),
        })
    }
}
