//! Subset of the Slides REST resources the game needs.

use serde::Deserialize;

use crate::slides::SlideContent;

/// `presentations.get` response restricted to `slides.objectId`.
#[derive(Debug, Deserialize)]
pub struct PresentationDocument {
    #[serde(default)]
    pub slides: Option<Vec<PageRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    pub object_id: String,
}

/// `presentations.pages.get` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub object_id: String,
    #[serde(default)]
    pub page_properties: Option<PageProperties>,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProperties {
    #[serde(default)]
    pub page_background_fill: Option<PageBackgroundFill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBackgroundFill {
    #[serde(default)]
    pub stretched_picture_fill: Option<StretchedPictureFill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchedPictureFill {
    #[serde(default)]
    pub content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub element_group: Option<Group>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub children: Vec<PageElement>,
}

impl PresentationDocument {
    /// Slide IDs in presentation order, `None` when the provider returned no page list.
    pub fn into_slide_ids(self) -> Option<Vec<String>> {
        self.slides
            .map(|pages| pages.into_iter().map(|page| page.object_id).collect())
    }
}

impl From<PageDocument> for SlideContent {
    fn from(page: PageDocument) -> Self {
        let background_image_url = page
            .page_properties
            .and_then(|props| props.page_background_fill)
            .and_then(|fill| fill.stretched_picture_fill)
            .and_then(|picture| picture.content_url);

        let mut element_image_urls = Vec::new();
        collect_images(page.page_elements, &mut element_image_urls);

        Self {
            object_id: page.object_id,
            background_image_url,
            element_image_urls,
        }
    }
}

fn collect_images(elements: Vec<PageElement>, out: &mut Vec<String>) {
    for element in elements {
        if let Some(url) = element.image.and_then(|image| image.content_url) {
            out.push(url);
        }
        if let Some(group) = element.element_group {
            collect_images(group.children, out);
        }
    }
}
