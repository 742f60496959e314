//! Profile operations for the logged-in user

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::api::{
    ApiClient, Auth, USER_CURRENT, USER_DELETE, USER_UPDATE, USER_UPLOAD_PHOTO,
};
use crate::error::Error;
use crate::result::{ResultStream, track};
use crate::types::{UpdateUserRequest, User};

#[derive(Clone)]
pub struct UserRepository {
    api: Arc<ApiClient>,
}

impl UserRepository {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn current_user(&self) -> ResultStream<User> {
        let api = Arc::clone(&self.api);
        track(async move { api.get::<User>(USER_CURRENT).await })
    }

    /// Change the display name and, when non-empty, the password
    pub fn update_user(&self, name: &str, password: &str) -> ResultStream<Option<User>> {
        let api = Arc::clone(&self.api);
        let body = UpdateUserRequest {
            name: name.trim().to_string(),
            password: password.to_string(),
        };
        track(async move {
            if body.name.is_empty() {
                return Err(Error::InvalidInput("name is required".to_string()));
            }
            let builder = api
                .request(Method::PUT, USER_UPDATE, Auth::Bearer)
                .await?
                .json(&body);
            api.send_optional::<User>(builder).await
        })
    }

    pub fn upload_photo(&self, file_name: &str, bytes: Vec<u8>) -> ResultStream<Option<User>> {
        let api = Arc::clone(&self.api);
        let file_name = file_name.to_string();
        track(async move {
            if bytes.is_empty() {
                return Err(Error::InvalidInput("photo is empty".to_string()));
            }
            let part = Part::bytes(bytes)
                .file_name(file_name.clone())
                .mime_str(image_mime(&file_name))?;
            let form = Form::new().part("profileImage", part);

            let builder = api
                .request(Method::POST, USER_UPLOAD_PHOTO, Auth::Bearer)
                .await?
                .multipart(form);
            let reply = api.send_optional::<User>(builder).await?;
            info!("Profile photo uploaded");
            Ok(reply)
        })
    }

    /// Delete the account; the local session goes with it
    pub fn delete_account(&self) -> ResultStream<()> {
        let api = Arc::clone(&self.api);
        track(async move {
            let builder = api.request(Method::DELETE, USER_DELETE, Auth::Bearer).await?;
            let reply = api.send_unit(builder).await?;
            api.session().clear().await?;
            info!("Account deleted");
            Ok(reply)
        })
    }
}

fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime("me.PNG"), "image/png");
        assert_eq!(image_mime("me.jpeg"), "image/jpeg");
        assert_eq!(image_mime("avatar"), "application/octet-stream");
    }
}
