use serde::{Deserialize, Serialize};

/// POST /api/url request body
#[derive(Debug, Deserialize)]
pub struct ImageUrlRequest {
    pub url: String,
    pub question: String,
}

/// Answer returned by both VQA endpoints
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    /// Where the image was stored; its basename can be fetched via /images/{name}
    pub image_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_request_deserializes() {
        let request: ImageUrlRequest = serde_json::from_str(
            r#"{"url": "https://example.com/cat.jpg", "question": "What animal is this?"}"#,
        )
        .unwrap();
        assert_eq!(request.url, "https://example.com/cat.jpg");
        assert_eq!(request.question, "What animal is this?");
    }

    #[test]
    fn answer_response_shape() {
        let response = AnswerResponse {
            answer: "A cat.".to_string(),
            image_path: "temp_images/abc.jpg".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["answer"], "A cat.");
        assert_eq!(value["image_path"], "temp_images/abc.jpg");
    }
}
