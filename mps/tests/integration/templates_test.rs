//! Create, rename and import for the processing templates

use mockito::{Server, ServerGuard};
use serde_json::{json, Value};
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ReadResourceRequest, Resource, UpdateResourceRequest,
};
use tfplug::types::ClientCapabilities;

use crate::common::{mock_action, mock_request, resource, to_json, value};

struct TemplateKind {
    type_name: &'static str,
    /// Action suffix shared by Create*, Modify*, Describe*s and Delete*
    action: &'static str,
    set: &'static str,
    definition: i64,
    config: fn(&str) -> Value,
    described: fn(&str) -> Value,
}

/// States seen along the way: after create, after the rename and after an
/// import by definition.
struct States {
    created: Value,
    renamed: Value,
    imported: Value,
}

impl TemplateKind {
    fn described_set(&self, name: &str) -> Value {
        let mut template = (self.described)(name);
        if template.get("Definition").is_none() {
            template["Definition"] = json!(self.definition);
        }
        if template.get("Type").is_none() {
            template["Type"] = json!("Custom");
        }
        let mut page = json!({"TotalCount": 1});
        page[self.set] = json!([template]);
        page
    }

    async fn describe(&self, server: &mut ServerGuard, name: &str) -> mockito::Mock {
        mock_action(
            server,
            &format!("Describe{}s", self.action),
            self.described_set(name),
        )
        .await
    }

    async fn run(&self) -> States {
        let mut server = Server::new_async().await;
        let definition = self.definition.to_string();

        let create_mock = mock_request(
            &mut server,
            &format!("Create{}", self.action),
            json!({"Name": "terraform-template"}),
            json!({"Definition": self.definition}),
        )
        .await;
        let describe_mock = self.describe(&mut server, "terraform-template").await;

        let resource = resource(&server, self.type_name).await;
        let config = value((self.config)("terraform-template"));
        let created = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: self.type_name.to_string(),
                    planned_state: config.clone(),
                    config,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
        create_mock.assert_async().await;
        assert_eq!(to_json(&created.new_state)["id"], definition.as_str());

        describe_mock.remove_async().await;
        let modify_mock = mock_request(
            &mut server,
            &format!("Modify{}", self.action),
            json!({"Definition": self.definition, "Name": "terraform-template-renamed"}),
            json!({}),
        )
        .await;
        let _describe_renamed = self.describe(&mut server, "terraform-template-renamed").await;

        let config = value((self.config)("terraform-template-renamed"));
        let updated = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: self.type_name.to_string(),
                    prior_state: created.new_state.clone(),
                    planned_state: config.clone(),
                    config,
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
        modify_mock.assert_async().await;
        assert_eq!(
            to_json(&updated.new_state)["name"],
            "terraform-template-renamed"
        );

        let imported = resource
            .as_importable()
            .unwrap()
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    type_name: self.type_name.to_string(),
                    id: definition.clone(),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;
        assert!(imported.diagnostics.is_empty());
        let read = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: self.type_name.to_string(),
                    current_state: imported.imported_resources[0].state.clone(),
                    private: vec![],
                    provider_meta: None,
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;
        assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
        let imported_state = to_json(&read.new_state.unwrap());
        assert_eq!(imported_state["id"], definition.as_str());
        assert_eq!(imported_state["name"], "terraform-template-renamed");

        let delete_mock = mock_request(
            &mut server,
            &format!("Delete{}", self.action),
            json!({"Definition": self.definition}),
            json!({}),
        )
        .await;
        let deleted = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: self.type_name.to_string(),
                    prior_state: updated.new_state.clone(),
                    planned_private: vec![],
                    provider_meta: None,
                },
            )
            .await;
        assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
        delete_mock.assert_async().await;

        States {
            created: to_json(&created.new_state),
            renamed: to_json(&updated.new_state),
            imported: imported_state,
        }
    }
}

fn watermark_config(name: &str) -> Value {
    json!({
        "id": null,
        "type": "image",
        "name": name,
        "comment": null,
        "coordinate_origin": "TopLeft",
        "x_pos": "10%",
        "y_pos": "10%",
        "image_template": [{
            "image_content": "aGVsbG8=",
            "width": "10%",
            "height": "0px",
            "repeat_type": "repeat"
        }],
        "text_template": [],
        "svg_template": []
    })
}

fn watermark_described(name: &str) -> Value {
    json!({
        "Type": "image",
        "Name": name,
        "CoordinateOrigin": "TopLeft",
        "XPos": "10%",
        "YPos": "10%",
        "ImageTemplate": {
            "ImageUrl": "https://example.cos.ap-guangzhou.myqcloud.com/watermark.png",
            "Width": "10%",
            "Height": "0px",
            "RepeatType": "repeat"
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn watermark_template_lifecycle() {
    let states = TemplateKind {
        type_name: "tencentcloud_mps_watermark_template",
        action: "WatermarkTemplate",
        set: "WatermarkTemplateSet",
        definition: 20001,
        config: watermark_config,
        described: watermark_described,
    }
    .run()
    .await;

    // MPS only returns the image URL; the uploaded content stays as configured.
    assert_eq!(states.created["image_template"][0]["image_content"], "aGVsbG8=");
    assert_eq!(states.renamed["image_template"][0]["image_content"], "aGVsbG8=");
    assert_eq!(states.imported["type"], "image");
    assert_eq!(states.imported["image_template"][0]["width"], "10%");
}

fn transcode_config(name: &str) -> Value {
    json!({
        "id": null,
        "container": "mp4",
        "name": name,
        "comment": null,
        "remove_video": 0,
        "remove_audio": 0,
        "video_template": [{
            "codec": "libx264",
            "fps": 30,
            "bitrate": 1024,
            "resolution_adaptive": "open",
            "width": 1280,
            "height": 720,
            "gop": null,
            "fill_type": "black",
            "vcrf": null
        }],
        "audio_template": [{
            "codec": "libfdk_aac",
            "bitrate": 128,
            "sample_rate": 44100,
            "audio_channel": 2
        }],
        "tehd_config": [],
        "enhance_config": []
    })
}

fn transcode_described(name: &str) -> Value {
    json!({
        // DescribeTranscodeTemplates reports the definition as a string.
        "Definition": "30001",
        "Container": "mp4",
        "Name": name,
        "RemoveVideo": 0,
        "RemoveAudio": 0,
        "VideoTemplate": {
            "Codec": "libx264",
            "Fps": 30,
            "Bitrate": 1024,
            "ResolutionAdaptive": "open",
            "Width": 1280,
            "Height": 720,
            "FillType": "black"
        },
        "AudioTemplate": {
            "Codec": "libfdk_aac",
            "Bitrate": 128,
            "SampleRate": 44100,
            "AudioChannel": 2
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn transcode_template_lifecycle() {
    let states = TemplateKind {
        type_name: "tencentcloud_mps_transcode_template",
        action: "TranscodeTemplate",
        set: "TranscodeTemplateSet",
        definition: 30001,
        config: transcode_config,
        described: transcode_described,
    }
    .run()
    .await;

    assert_eq!(states.created["video_template"][0]["codec"], "libx264");
    assert_eq!(states.renamed["audio_template"][0]["sample_rate"], 44100);
    assert_eq!(states.imported["container"], "mp4");
    assert_eq!(states.imported["video_template"][0]["width"], 1280);
}

fn ai_recognition_config(name: &str) -> Value {
    json!({
        "id": null,
        "name": name,
        "comment": null,
        "face_configure": [{
            "switch": "ON",
            "score": 85.0,
            "default_library_label_set": ["entertainment"],
            "user_define_library_label_set": null,
            "face_library": "All"
        }],
        "ocr_full_text_configure": [{"switch": "ON"}],
        "ocr_words_configure": [],
        "asr_full_text_configure": [{"switch": "ON", "subtitle_format": "vtt"}],
        "asr_words_configure": []
    })
}

fn ai_recognition_described(name: &str) -> Value {
    json!({
        "Name": name,
        "FaceConfigure": {
            "Switch": "ON",
            "Score": 85.0,
            "DefaultLibraryLabelSet": ["entertainment"],
            "FaceLibrary": "All"
        },
        "OcrFullTextConfigure": {"Switch": "ON"},
        "AsrFullTextConfigure": {"Switch": "ON", "SubtitleFormat": "vtt"}
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn ai_recognition_template_lifecycle() {
    let states = TemplateKind {
        type_name: "tencentcloud_mps_ai_recognition_template",
        action: "AIRecognitionTemplate",
        set: "AIRecognitionTemplateSet",
        definition: 40001,
        config: ai_recognition_config,
        described: ai_recognition_described,
    }
    .run()
    .await;

    assert_eq!(states.created["face_configure"][0]["switch"], "ON");
    assert_eq!(
        states.renamed["asr_full_text_configure"][0]["subtitle_format"],
        "vtt"
    );
    assert_eq!(states.imported["ocr_full_text_configure"][0]["switch"], "ON");
    assert_eq!(states.imported["ocr_words_configure"], json!([]));
}

fn content_review_config(name: &str) -> Value {
    json!({
        "id": null,
        "name": name,
        "comment": null,
        "porn_configure": [{
            "img_review_info": [{
                "switch": "ON",
                "label_set": ["porn", "vulgar"],
                "block_confidence": 90,
                "review_confidence": 75
            }],
            "asr_review_info": [],
            "ocr_review_info": []
        }],
        "terrorism_configure": [],
        "political_configure": [],
        "prohibited_configure": [{
            "asr_review_info": [{"switch": "ON", "block_confidence": 100, "review_confidence": 75}],
            "ocr_review_info": []
        }],
        "user_define_configure": []
    })
}

fn content_review_described(name: &str) -> Value {
    json!({
        "Name": name,
        "PornConfigure": {
            "ImgReviewInfo": {
                "Switch": "ON",
                "LabelSet": ["porn", "vulgar"],
                "BlockConfidence": 90,
                "ReviewConfidence": 75
            }
        },
        "ProhibitedConfigure": {
            "AsrReviewInfo": {"Switch": "ON", "BlockConfidence": 100, "ReviewConfidence": 75}
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn content_review_template_lifecycle() {
    let states = TemplateKind {
        type_name: "tencentcloud_mps_content_review_template",
        action: "ContentReviewTemplate",
        set: "ContentReviewTemplateSet",
        definition: 50001,
        config: content_review_config,
        described: content_review_described,
    }
    .run()
    .await;

    let img = &states.created["porn_configure"][0]["img_review_info"][0];
    assert_eq!(img["label_set"], json!(["porn", "vulgar"]));
    assert_eq!(img["block_confidence"], 90);
    assert_eq!(
        states.renamed["prohibited_configure"][0]["asr_review_info"][0]["review_confidence"],
        75
    );
    assert_eq!(states.imported["terrorism_configure"], json!([]));
}
