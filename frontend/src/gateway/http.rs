//! `Gateway` and `ObjectStorage` over the backend's JSON API.

use async_trait::async_trait;
use common::error::GatewayError;
use common::gateway::{Gateway, ObjectStorage};
use common::model::favourite::FavouriteRow;
use common::model::image::ImageRow;
use common::model::property::Property;
use common::model::section::SectionRow;
use common::requests::{
    DeleteFavouritesRequest, DeleteImagesRequest, GuideWrite, ImagePayload,
    InsertFavouritesRequest, ListImagesRequest, PropertyPayload, SectionOrder, SectionPayload,
    UpdateSectionOrdersRequest, UploadResponse,
};
use common::save::SaveReport;
use common::session::SessionWatch;
use gloo_net::http::{Request, RequestBuilder, Response};
use js_sys::{Array, Uint8Array};
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::{Blob, BlobPropertyBag, FormData};

pub struct HttpGateway {
    base: String,
    token: Option<String>,
    watch: SessionWatch,
}

impl HttpGateway {
    pub fn new(base: &str, token: Option<String>, watch: SessionWatch) -> Self {
        Self {
            base: base.to_string(),
            token,
            watch,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        with_bearer(builder, self.token.as_deref())
    }

    /// A `401` on a request that carried a token means the session is gone.
    fn checked<T>(&self, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
        if self.token.is_some() {
            self.watch.observe(result)
        } else {
            result
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .authorize(Request::get(&self.url(path)))
            .send()
            .await
            .map_err(transport_error)?;
        self.checked(read_json(response).await)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, GatewayError> {
        let request = self
            .authorize(Request::post(&self.url(path)))
            .json(body)
            .map_err(transport_error)?;
        request.send().await.map_err(transport_error)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        self.checked(read_json(response).await)
    }

    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), GatewayError> {
        let response = self.post(path, body).await?;
        if response.ok() {
            Ok(())
        } else {
            self.checked(Err(error_from(response).await))
        }
    }

    /// Sends the whole guide to the transactional save endpoint. On failure
    /// the error is the backend's account of the step that failed.
    pub async fn save_guide_atomic(&self, guide: &GuideWrite) -> Result<SaveReport, String> {
        let response = self
            .post("/api/guides/save", guide)
            .await
            .map_err(|e| e.to_string())?;
        if response.ok() {
            return response.json().await.map_err(|e| e.to_string());
        }
        let status = response.status();
        if status == 401 {
            let _ = self.checked::<()>(Err(GatewayError::Unauthorized));
        }
        match response.text().await {
            Ok(body) if !body.is_empty() => Err(body),
            _ => Err(format!("save failed with HTTP {}", status)),
        }
    }

    /// Upload answers are server-relative; make them absolute for a backend
    /// on another origin.
    fn public_url(&self, url: String) -> String {
        if url.starts_with('/') {
            self.url(&url)
        } else {
            url
        }
    }
}

pub(crate) fn with_bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

pub(crate) fn transport_error(e: gloo_net::Error) -> GatewayError {
    GatewayError::Backend(e.to_string())
}

/// Rebuilds the backend's error variant from status code and body.
pub(crate) async fn error_from(response: Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status {
        401 => GatewayError::Unauthorized,
        404 => GatewayError::NotFound(body),
        409 => GatewayError::Conflict(body),
        _ if body.is_empty() => GatewayError::Backend(format!("HTTP {}", status)),
        _ => GatewayError::Backend(body),
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    if !response.ok() {
        return Err(error_from(response).await);
    }
    response.json().await.map_err(transport_error)
}

fn encode_segment(segment: &str) -> String {
    js_sys::encode_uri_component(segment).into()
}

#[async_trait(?Send)]
impl Gateway for HttpGateway {
    async fn list_properties(&self) -> Result<Vec<Property>, GatewayError> {
        self.get_json("/api/properties").await
    }

    async fn find_property_by_slug(&self, slug: &str) -> Result<Option<Property>, GatewayError> {
        self.get_json(&format!("/api/properties/by-slug/{}", encode_segment(slug)))
            .await
    }

    async fn upsert_property(&self, payload: &PropertyPayload) -> Result<Property, GatewayError> {
        self.post_json("/api/properties/upsert", payload).await
    }

    async fn list_sections(&self, property_id: &str) -> Result<Vec<SectionRow>, GatewayError> {
        self.get_json(&format!("/api/sections/{}", encode_segment(property_id)))
            .await
    }

    async fn upsert_section(&self, payload: &SectionPayload) -> Result<SectionRow, GatewayError> {
        self.post_json("/api/sections/upsert", payload).await
    }

    async fn update_section_orders(
        &self,
        property_id: &str,
        orders: &[SectionOrder],
    ) -> Result<(), GatewayError> {
        let request = UpdateSectionOrdersRequest {
            property_id: property_id.to_string(),
            orders: orders.to_vec(),
        };
        self.post_unit("/api/sections/order", &request).await
    }

    async fn list_images(&self, section_ids: &[String]) -> Result<Vec<ImageRow>, GatewayError> {
        let request = ListImagesRequest {
            section_ids: section_ids.to_vec(),
        };
        self.post_json("/api/images/list", &request).await
    }

    async fn delete_images(&self, section_id: &str, image_urls: &[String]) -> Result<(), GatewayError> {
        let request = DeleteImagesRequest {
            section_id: section_id.to_string(),
            image_urls: image_urls.to_vec(),
        };
        self.post_unit("/api/images/delete", &request).await
    }

    async fn upsert_images(&self, images: &[ImagePayload]) -> Result<(), GatewayError> {
        self.post_unit("/api/images/upsert", images).await
    }

    async fn list_favourites(&self, property_id: &str) -> Result<Vec<FavouriteRow>, GatewayError> {
        self.get_json(&format!("/api/favourites/{}", encode_segment(property_id)))
            .await
    }

    async fn delete_favourites(&self, property_id: &str) -> Result<(), GatewayError> {
        let request = DeleteFavouritesRequest {
            property_id: property_id.to_string(),
        };
        self.post_unit("/api/favourites/delete", &request).await
    }

    async fn insert_favourites(&self, favourites: &[FavouriteRow]) -> Result<(), GatewayError> {
        let request = InsertFavouritesRequest {
            favourites: favourites.to_vec(),
        };
        self.post_unit("/api/favourites/insert", &request).await
    }
}

#[async_trait(?Send)]
impl ObjectStorage for HttpGateway {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let form = build_upload_form(path, &bytes, content_type)
            .map_err(|e| GatewayError::Backend(format!("could not build upload: {:?}", e)))?;
        let response = self
            .authorize(Request::post(&self.url("/api/storage/upload")))
            .body(form)
            .map_err(transport_error)?
            .send()
            .await
            .map_err(transport_error)?;
        let answer: UploadResponse = self.checked(read_json(response).await)?;
        Ok(self.public_url(answer.url))
    }
}

fn build_upload_form(
    path: &str,
    bytes: &[u8],
    content_type: &str,
) -> Result<FormData, wasm_bindgen::JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let form = FormData::new()?;
    form.append_with_str("path", path)?;
    form.append_with_blob_and_filename("file", &blob, file_name)?;
    Ok(form)
}
