use crate::error::{GatewayError, MergeError};
use crate::gateway::Gateway;
use crate::model::favourite::FavouriteRow;
use crate::model::guide::GroupView;
use crate::model::image::ImageRow;
use crate::model::property::Property;
use crate::model::section::SectionRow;
use crate::template::{merge_with_defaults, TemplateGroup};

/// Every stored row of one guide, as the gateway returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedGuide {
    pub property: Property,
    /// Ordered by display order.
    pub sections: Vec<SectionRow>,
    pub images: Vec<ImageRow>,
    pub favourites: Vec<FavouriteRow>,
}

impl LoadedGuide {
    /// Images of one section, in display order.
    pub fn images_for<'a>(&'a self, section_id: &'a str) -> impl Iterator<Item = &'a ImageRow> + 'a {
        self.images.iter().filter(move |img| img.section_id == section_id)
    }

    /// The editor's view model for this guide.
    pub fn merge(&self, template: &[TemplateGroup]) -> Result<Vec<GroupView>, MergeError> {
        merge_with_defaults(template, &self.sections, &self.images, &self.favourites)
    }
}

/// Loads a guide by slug. `Ok(None)` means no property has that slug.
pub async fn load_guide<G>(gateway: &G, slug: &str) -> Result<Option<LoadedGuide>, GatewayError>
where
    G: Gateway + ?Sized,
{
    let Some(property) = gateway.find_property_by_slug(slug).await? else {
        log::info!("no property with slug `{}`", slug);
        return Ok(None);
    };

    let mut sections = gateway.list_sections(&property.id).await?;
    sections.sort_by_key(|s| s.display_order);

    let mut images = if sections.is_empty() {
        Vec::new()
    } else {
        let ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();
        gateway.list_images(&ids).await?
    };
    images.sort_by_key(|img| img.display_order);

    let mut favourites = gateway.list_favourites(&property.id).await?;
    favourites.sort_by_key(|f| f.display_order);

    Ok(Some(LoadedGuide {
        property,
        sections,
        images,
        favourites,
    }))
}
