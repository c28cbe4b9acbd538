//! Registers a [`Filesystem`] rooted at the project root.

use super::{services, Context, ServiceProvider};
use crate::container::Container;
use crate::error::BopsResult;
use crate::filesystem::Filesystem;

#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemProvider;

impl ServiceProvider for FilesystemProvider {
    fn name(&self) -> &str {
        services::FILESYSTEM
    }

    fn register(&self, container: &mut Container, ctx: &Context) -> BopsResult<()> {
        container.set_shared(self.name(), Filesystem::rooted(ctx.navigator.root_dir()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{install, test_support};
    use tempfile::TempDir;

    #[test]
    fn test_filesystem_rooted_at_project_root() {
        let dir = TempDir::new().unwrap();
        let ctx = test_support::context(dir.path(), "testing");
        let mut container = Container::new();

        install(&FilesystemProvider, &mut container, &ctx).unwrap();
        let fs = container.get::<Filesystem>(services::FILESYSTEM).unwrap();
        assert_eq!(fs.root(), dir.path());
    }
}
