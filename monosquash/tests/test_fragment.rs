use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use monosquash::{
    config::ImageConfig,
    squashfs::{fragment, SquashfsImage, SquashfsToolchain, SquashfsTools},
    SquashResult,
};
use tempfile::TempDir;
use tokio::fs;

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_fragment_round_trip_with_fake_tools() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let tools = Arc::new(helper::FakeTools::default());
    let config = ImageConfig::builder().staging_root(temp.path()).build();
    let image = SquashfsImage::open_with(temp.path().join("base.sqfs"), config, tools.clone()).await?;

    assert_eq!(
        image.list_paths().await?,
        vec!["etc/hostname", "usr/bin/su", "dev/sda"]
    );

    let output = temp.path().join("out").join("fragment.sqfs");
    fs::create_dir_all(output.parent().unwrap()).await?;

    let built = image
        .build_fragment(&["/etc/hostname", "dev/sda"], &output)
        .await?;
    assert_eq!(built, output);
    assert!(fs::metadata(&output).await?.len() > 0);

    let manifest = tools.last_manifest.lock().unwrap().clone().unwrap();
    assert_eq!(
        manifest,
        "dev/sda b 0660 0 6 8 0\netc/hostname m 0644 0 0\n"
    );

    let (scratch, pseudo) = fragment::scratch_paths(&output);
    assert!(!scratch.exists());
    assert!(!pseudo.exists());

    let staging = image.staging_dir().to_path_buf();
    image.close().await?;
    assert!(!staging.exists());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_fragment_images_are_independent() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let tools = Arc::new(helper::FakeTools::default());

    let config = ImageConfig::builder().staging_root(temp.path()).build();
    let first = SquashfsImage::open_with(temp.path().join("a.sqfs"), config, tools.clone()).await?;
    let config = ImageConfig::builder().staging_root(temp.path()).build();
    let second = SquashfsImage::open_with(temp.path().join("b.sqfs"), config, tools).await?;

    assert_ne!(first.staging_dir(), second.staging_dir());

    first.close().await?;
    assert_eq!(second.list_paths().await?.len(), 3);
    second.close().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
#[ignore = "requires squashfs-tools and root for device nodes"]
async fn test_fragment_round_trip_with_squashfs_tools() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let tools = SquashfsToolchain::resolve()?;

    // Build a source image from a plain tree.
    let tree = temp.path().join("tree");
    fs::create_dir_all(tree.join("etc")).await?;
    fs::create_dir_all(tree.join("dev")).await?;
    fs::write(tree.join("etc/hostname"), "box\n").await?;
    fs::write(tree.join("etc/motd"), "hello\n").await?;

    let pseudo = temp.path().join("base.pseudo");
    fs::write(&pseudo, "dev/sda b 0660 0 6 8 0\n").await?;

    let base = temp.path().join("base.sqfs");
    tools.repack(&tree, &base, &pseudo).await?;

    let config = ImageConfig::builder()
        .staging_root(temp.path().join("staging"))
        .build();
    let image = SquashfsImage::open_with(&base, config, Arc::new(tools.clone())).await?;

    let paths = image.list_paths().await?;
    assert!(paths.contains(&"etc/hostname".to_string()));
    assert!(paths.contains(&"dev/sda".to_string()));

    let output = temp.path().join("fragment.sqfs");
    image
        .build_fragment(&["etc/hostname", "dev/sda"], &output)
        .await?;
    image.close().await?;

    let fragment = SquashfsImage::open_with(
        &output,
        ImageConfig::builder()
            .staging_root(temp.path().join("staging"))
            .build(),
        Arc::new(tools),
    )
    .await?;

    let manifest = fragment.manifest_for(&["dev/sda", "etc/hostname"]).await?;
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.contains(&"dev/sda b 0660 0 6 8 0"));
    assert!(lines.iter().any(|line| line.starts_with("etc/hostname m 0644 ")));
    assert!(!fragment
        .list_paths()
        .await?
        .contains(&"etc/motd".to_string()));

    fragment.close().await?;
    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Helpers
//--------------------------------------------------------------------------------------------------

mod helper {
    use super::*;

    const LISTING: &str = "\
drwxr-xr-x 0/0                      52 2024-03-01 12:00 squashfs-root
drwxr-xr-x 0/0                      31 2024-03-01 12:00 squashfs-root/etc
-rw-r--r-- 0/0                       4 2024-03-01 12:00 squashfs-root/etc/hostname
drwxr-xr-x 0/0                      28 2024-03-01 12:00 squashfs-root/usr
drwxr-xr-x 0/0                      28 2024-03-01 12:00 squashfs-root/usr/bin
-rwsr-xr-x 0/0                   63960 2024-03-01 12:00 squashfs-root/usr/bin/su
brw-rw---- 0/6                   8,  0 2024-03-01 12:00 squashfs-root/dev/sda
";

    /// Tools that extract a fixed tree and repack by concatenating the manifest and files.
    #[derive(Default)]
    pub(super) struct FakeTools {
        pub(super) last_manifest: Mutex<Option<String>>,
    }

    #[async_trait]
    impl SquashfsTools for FakeTools {
        async fn extract(&self, _image: &Path, dest: &Path) -> SquashResult<()> {
            fs::create_dir_all(dest.join("etc")).await?;
            fs::create_dir_all(dest.join("usr/bin")).await?;
            fs::write(dest.join("etc/hostname"), "box\n").await?;
            fs::write(dest.join("usr/bin/su"), "su").await?;
            Ok(())
        }

        async fn list(&self, _image: &Path) -> SquashResult<String> {
            Ok(LISTING.to_string())
        }

        async fn repack(
            &self,
            source_dir: &Path,
            output: &Path,
            pseudo_file: &Path,
        ) -> SquashResult<()> {
            let manifest = fs::read_to_string(pseudo_file).await?;
            let hostname = fs::read_to_string(source_dir.join("etc/hostname")).await?;
            assert!(!source_dir.join("usr").exists());

            fs::write(output, format!("{}{}", manifest, hostname)).await?;
            *self.last_manifest.lock().unwrap() = Some(manifest);
            Ok(())
        }
    }
}
