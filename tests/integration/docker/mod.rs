//! Docker integration tests
//!
//! Exercises the Engine API client against a live daemon. Requires
//! `hello-world:latest` to be present locally.

#[cfg(all(test, feature = "docker"))]
mod tests {
    use docker_tool::{DockerEngine, ImageEngine, ImageReference, ImageShuttle, Notifier};
    use std::fs;
    use tempfile::TempDir;

    const TEST_IMAGE: &str = "hello-world:latest";

    #[test]
    fn test_docker_engine_creation() {
        let engine = DockerEngine::new().expect("Should connect to Docker");
        assert_eq!(engine.name(), "docker");
    }

    #[test]
    fn test_list_images_reports_test_image() {
        let engine = DockerEngine::new().expect("Should connect to Docker");
        let images = engine.list_images().expect("Should list images");

        assert!(
            images
                .iter()
                .any(|image| image.repo_tags.iter().any(|tag| tag == TEST_IMAGE)),
            "{} should be present locally",
            TEST_IMAGE
        );
    }

    #[test]
    fn test_export_and_load_round_trip() {
        let engine = DockerEngine::new().expect("Should connect to Docker");
        let dir = TempDir::new().expect("Should create temp dir");
        let archive = dir.path().join("hello-world-latest.tar");

        let mut file = fs::File::create(&archive).unwrap();
        let written = engine
            .export_image(TEST_IMAGE, &mut file)
            .expect("Should export hello-world");
        drop(file);
        assert!(written > 0);
        assert_eq!(fs::metadata(&archive).unwrap().len(), written);

        let shuttle = ImageShuttle::new(engine, Notifier::new(1));
        let loaded = shuttle.load_all(dir.path()).expect("Should load archive");
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].response.is_empty());
    }

    #[test]
    fn test_load_rejects_non_archive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "definitely not a tarball").unwrap();
        let shuttle = ImageShuttle::new(DockerEngine::new().unwrap(), Notifier::new(1));

        assert!(shuttle.load_all(dir.path()).is_err());
    }

    #[test]
    fn test_tag_and_remove() {
        let engine = DockerEngine::new().unwrap();
        let target = ImageReference::parse("docker-tool-test.local/hello-world:latest");

        engine.tag_image(TEST_IMAGE, &target).expect("Should tag image");
        engine
            .remove_image(&target.to_string())
            .expect("Should remove the added tag");
    }
}
