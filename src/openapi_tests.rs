#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        for schema in [
            "ErrorResponse",
            "HealthResponse",
            "TagResponse",
            "IngredientResponse",
            "RecipeResponse",
            "RecipeDetailResponse",
            "UserResponse",
        ] {
            assert!(components.schemas.contains_key(schema), "missing schema {}", schema);
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let error_response_schema = components.schemas.get("ErrorResponse").unwrap();

        // Verify ErrorResponse has the expected structure
        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = error_response_schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("error"));
            assert!(properties.contains_key("code"));
            assert!(properties.contains_key("success"));
        } else {
            panic!("ErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let health_response_schema = components.schemas.get("HealthResponse").unwrap();

        // Verify HealthResponse has the expected structure
        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = health_response_schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("status"));
            assert!(properties.contains_key("version"));
            assert!(properties.contains_key("database"));
        } else {
            panic!("HealthResponse should be an object schema");
        }
    }

    #[test]
    fn test_openapi_paths_contain_recipe_endpoints() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/health",
            "/api/user/create/",
            "/api/user/token/",
            "/api/user/me/",
            "/api/recipe/tags/",
            "/api/recipe/ingredients/",
            "/api/recipe/recipes/",
            "/api/recipe/recipes/{recipe_id}/",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }

        let tags_path = paths.get("/api/recipe/tags/").unwrap();
        let tags_get = tags_path
            .operations
            .get(&utoipa::openapi::PathItemType::Get)
            .unwrap();
        assert!(tags_get.responses.responses.contains_key("200"));
        assert!(tags_get.responses.responses.contains_key("401"));
        assert!(tags_get.security.is_some());
    }

    #[test]
    fn test_token_security_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();

        assert!(components.security_schemes.contains_key("token"));
        let json = serde_json::to_value(&openapi).unwrap();
        assert_eq!(
            json["components"]["securitySchemes"]["token"]["name"],
            "Authorization"
        );
    }

    #[test]
    fn test_user_response_hides_password() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let user_schema = components.schemas.get("UserResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = user_schema {
            assert!(obj.properties.contains_key("email"));
            assert!(!obj.properties.contains_key("password"));
            assert!(!obj.properties.contains_key("password_hash"));
        } else {
            panic!("UserResponse should be an object schema");
        }
    }

    #[test]
    fn test_all_error_responses_reference_correct_schema() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_string(&openapi).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
