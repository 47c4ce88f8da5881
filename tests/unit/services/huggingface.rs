//! Tests for detection filtering and the inference client

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use outpainter::OutpaintError;
    use outpainter::io::configuration::{DEFAULT_DESCRIPTION_MODEL, DEFAULT_DETECTION_MODEL};
    use outpainter::io::error::Stage;
    use outpainter::services::huggingface::{
        Detection, DetectionBox, HuggingFaceClient, subject_boxes,
    };
    use outpainter::services::{FocusDetector, SceneDescriber, SubjectDetector};
    use outpainter::spatial::geometry::Rect;

    fn detection(label: &str, score: f64, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Detection {
        Detection {
            score,
            label: label.to_string(),
            bounds: DetectionBox {
                xmin,
                ymin,
                xmax,
                ymax,
            },
        }
    }

    fn unreachable_client() -> HuggingFaceClient {
        HuggingFaceClient::new("token")
            .expect("Client failed")
            .with_base_url("http://127.0.0.1:9/models/")
    }

    // Tests only confident person detections are kept, most confident first
    // Verified by keeping detections below the score threshold
    #[test]
    fn test_subject_boxes_filter_and_sort() {
        let detections = vec![
            detection("person", 0.7, 0.0, 0.0, 10.0, 10.0),
            detection("dog", 0.99, 5.0, 5.0, 6.0, 6.0),
            detection("person", 0.59, 1.0, 1.0, 2.0, 2.0),
            detection("person", 0.95, 20.0, 20.0, 30.0, 30.0),
            detection("person", 0.6, 40.0, 40.0, 50.0, 50.0),
        ];

        assert_eq!(
            subject_boxes(&detections),
            vec![
                Rect::new(20, 20, 30, 30),
                Rect::new(0, 0, 10, 10),
                Rect::new(40, 40, 50, 50)
            ]
        );
        assert!(subject_boxes(&[]).is_empty());
    }

    // Tests fractional boxes round outward and clamp at zero
    // Verified by rounding every edge to nearest
    #[test]
    fn test_detection_box_rounding() {
        let rect = DetectionBox {
            xmin: 10.6,
            ymin: -3.2,
            xmax: 20.1,
            ymax: 30.0,
        }
        .to_rect();
        assert_eq!(rect, Rect::new(10, 0, 21, 30));
    }

    // Tests the wire format with its reserved `box` key
    // Verified by removing the serde rename
    #[test]
    fn test_detection_deserialize() {
        let json = r#"[{"score": 0.998, "label": "person",
            "box": {"xmin": 12, "ymin": 40, "xmax": 200.5, "ymax": 310}}]"#;
        let detections: Vec<Detection> = serde_json::from_str(json).expect("Failed to parse");

        assert_eq!(detections.len(), 1);
        assert_eq!(subject_boxes(&detections), vec![Rect::new(12, 40, 201, 310)]);
    }

    // Tests builder overrides and defaults
    // Verified by ignoring the model overrides
    #[test]
    fn test_models() {
        let client = HuggingFaceClient::new("token").expect("Client failed");
        assert_eq!(client.description_model(), DEFAULT_DESCRIPTION_MODEL);
        assert_eq!(client.detection_model(), DEFAULT_DETECTION_MODEL);

        let custom = client
            .with_description_model("captioner")
            .with_detection_model("detector");
        assert_eq!(custom.description_model(), "captioner");
        assert_eq!(custom.detection_model(), "detector");
    }

    // Tests blank tokens are rejected before any request
    // Verified by deferring the token check to the first request
    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(
            HuggingFaceClient::new(""),
            Err(OutpaintError::MissingCredential { .. })
        ));
    }

    // Tests transport failures carry the calling stage
    // Verified by tagging every failure as description
    #[test]
    fn test_unreachable_service_stages() {
        let client = unreachable_client();
        let image = RgbaImage::new(2, 2);

        assert!(matches!(
            client.describe(&image),
            Err(OutpaintError::Collaborator {
                stage: Stage::Description,
                ..
            })
        ));
        assert!(matches!(
            client.detect_subjects(&image),
            Err(OutpaintError::Collaborator {
                stage: Stage::SubjectDetection,
                ..
            })
        ));
        assert!(matches!(
            client.detect_focus(&image),
            Err(OutpaintError::Collaborator {
                stage: Stage::FocusDetection,
                ..
            })
        ));
    }
}
