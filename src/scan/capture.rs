//! Selection state of the capture screen.

use crate::{
    analysis::{AnalysisRequest, Category, CropKind, ImageUpload},
    settings::ScanPreferences,
};

#[derive(Debug, Clone, Default)]
pub struct CaptureForm {
    category: Category,
    crop_kind: CropKind,
    file: Option<ImageUpload>,
}

impl CaptureForm {
    pub fn new(preferences: &ScanPreferences) -> Self {
        Self {
            category: preferences.category,
            crop_kind: preferences.crop_kind,
            file: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn crop_kind(&self) -> CropKind {
        self.crop_kind
    }

    pub fn selected_file(&self) -> Option<&ImageUpload> {
        self.file.as_ref()
    }

    /// Replaces any previously chosen file.
    pub fn choose_file(&mut self, upload: ImageUpload) {
        self.file = Some(upload);
    }

    /// Switching category discards the chosen file. A scan already running
    /// keeps the category it was started with.
    pub fn set_category(&mut self, category: Category) {
        if self.category != category {
            self.file = None;
        }
        self.category = category;
    }

    pub fn set_crop_kind(&mut self, crop_kind: CropKind) {
        self.crop_kind = crop_kind;
    }

    pub fn reset(&mut self) {
        self.file = None;
    }

    /// The request for the current selection, or `None` when no file is
    /// chosen.
    pub fn build_request(&self) -> Option<AnalysisRequest> {
        let image = self.file.clone()?;
        Some(AnalysisRequest {
            category: self.category,
            crop_kind: match self.category {
                Category::Soil => None,
                Category::Crop => Some(self.crop_kind),
            },
            image,
        })
    }

    pub fn preferences(&self) -> ScanPreferences {
        ScanPreferences {
            category: self.category,
            crop_kind: self.crop_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload::new(name, vec![7u8; 64])
    }

    #[test]
    fn starts_from_preferences() {
        let form = CaptureForm::new(&ScanPreferences {
            category: Category::Crop,
            crop_kind: CropKind::Potato,
        });
        assert_eq!(form.category(), Category::Crop);
        assert_eq!(form.crop_kind(), CropKind::Potato);
        assert!(form.build_request().is_none());
    }

    #[test]
    fn new_file_replaces_old_one() {
        let mut form = CaptureForm::default();
        form.choose_file(upload("first.png"));
        form.choose_file(upload("second.png"));

        let request = form.build_request().unwrap();
        assert_eq!(request.image.filename, "second.png");
        assert_eq!(request.category, Category::Soil);
        assert_eq!(request.crop_kind, None);
    }

    #[test]
    fn category_change_discards_file() {
        let mut form = CaptureForm::default();
        form.choose_file(upload("field.png"));

        form.set_category(Category::Soil);
        assert!(form.selected_file().is_some());

        form.set_category(Category::Crop);
        assert!(form.selected_file().is_none());
    }

    #[test]
    fn crop_request_carries_crop_kind() {
        let mut form = CaptureForm::default();
        form.set_category(Category::Crop);
        form.set_crop_kind(CropKind::Cotton);
        form.choose_file(upload("boll.jpg"));

        let request = form.build_request().unwrap();
        assert_eq!(request.crop_kind, Some(CropKind::Cotton));

        form.set_crop_kind(CropKind::Rice);
        assert!(form.selected_file().is_some());
        assert_eq!(form.preferences().crop_kind, CropKind::Rice);
    }

    #[test]
    fn reset_clears_file_only() {
        let mut form = CaptureForm::default();
        form.set_category(Category::Crop);
        form.choose_file(upload("leaf.png"));
        form.reset();

        assert!(form.selected_file().is_none());
        assert_eq!(form.category(), Category::Crop);
    }
}
