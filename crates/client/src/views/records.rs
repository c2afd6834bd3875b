//! Violation records: list, create, patch and delete.

use std::path::Path;

use trafficdesk_core::{
    Fine, RecordDraft, RecordId, RecordImage, RecordPatch, ViolationEntry, ViolationRecord,
    find_by_id, find_by_id_mut, remove_by_id,
};

use crate::app::App;
use crate::navigation::Route;
use crate::views::{ViewContext, ViewResult};

#[derive(Debug, Clone)]
pub struct RecordsView {
    ctx: ViewContext,
    records: Vec<ViolationRecord>,
}

impl RecordsView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            records: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> ViewResult<&[ViolationRecord]> {
        let result = self.ctx.app().gateway.list_records().await;
        self.records = self.ctx.settle(result, "Error fetching records")?;
        Ok(&self.records)
    }

    pub fn records(&self) -> &[ViolationRecord] {
        &self.records
    }

    pub fn find(&self, id: &RecordId) -> Option<&ViolationRecord> {
        find_by_id(&self.records, id)
    }

    /// Sum of every listed record's fines.
    pub fn total_fines(&self) -> Fine {
        self.records.iter().map(ViolationRecord::total_fine).sum()
    }

    /// Send a partial update; the local copy changes only once the server accepts it.
    pub async fn update(&mut self, id: &RecordId, patch: RecordPatch) -> ViewResult<()> {
        if patch.is_empty() {
            return self.ctx.invalid("Nothing to update");
        }

        let app = self.ctx.app().clone();
        let result = app.gateway.update_record(id, &patch).await;
        self.ctx.settle(result, "Error updating record")?;

        if let Some(record) = find_by_id_mut(&mut self.records, id) {
            patch.apply_to(record);
        }
        app.notifier.success("Record updated successfully");
        Ok(())
    }

    pub async fn delete(&mut self, id: &RecordId) -> ViewResult<()> {
        let app = self.ctx.app().clone();
        let result = app.gateway.delete_record(id).await;
        self.ctx.settle(result, "Error deleting record")?;

        remove_by_id(&mut self.records, id);
        app.notifier.success("Record deleted successfully");
        Ok(())
    }
}

/// New-record form.
#[derive(Debug, Clone)]
pub struct AddRecordView {
    ctx: ViewContext,
    draft: RecordDraft,
}

impl AddRecordView {
    /// The form starts with one empty violation row.
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            draft: RecordDraft {
                license_num: String::new(),
                name: String::new(),
                sex: String::new(),
                age: None,
                dob: String::new(),
                address: String::new(),
                violation_records: vec![ViolationEntry::new("", Fine::default())],
                image: None,
            },
        }
    }

    pub fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RecordDraft {
        &mut self.draft
    }

    pub fn add_violation(&mut self, entry: ViolationEntry) {
        match self.draft.violation_records.iter_mut().find(|v| v.is_blank()) {
            Some(blank) => *blank = entry,
            None => self.draft.violation_records.push(entry),
        }
    }

    pub fn remove_violation(&mut self, index: usize) -> Option<ViolationEntry> {
        (index < self.draft.violation_records.len())
            .then(|| self.draft.violation_records.remove(index))
    }

    /// Attach a photo from disk.
    pub async fn attach_image(&mut self, path: &Path) -> ViewResult<()> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(?path, error = %err, "could not read image");
                return self.ctx.invalid(format!("Could not read image {}", path.display()));
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        self.draft.image = Some(RecordImage {
            content_type: content_type_for(path),
            file_name,
            bytes,
        });
        Ok(())
    }

    pub async fn submit(&self) -> ViewResult<()> {
        if let Err(err) = self.draft.validate() {
            return self.ctx.invalid(err.message());
        }

        let app = self.ctx.app();
        let result = app.gateway.create_record(&self.draft).await;
        self.ctx.settle(result, "Error creating record")?;

        app.notifier.success("Record created successfully");
        app.open_route(Route::Records);
        Ok(())
    }
}

fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
