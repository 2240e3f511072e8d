use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::launch::handler::validate_url,
    ),
    components(
        schemas(
            crate::modules::launch::dto::ValidateRequest,
            crate::modules::launch::dto::ValidateResponse,
        )
    ),
    tags(
        (name = "Launch", description = "YouTube URL checks. Launches themselves run over the /ws socket")
    )
)]
pub struct ApiDoc;
