//! Share links.

use tracing::info;

use crate::error::Result;
use crate::session::Session;

impl Session {
    /// Create a share link for one object.
    ///
    /// The backend decides how long the link stays valid.
    ///
    /// # Example
    /// ```no_run
    /// # use bucketlib::Session;
    /// # async fn example() -> bucketlib::Result<()> {
    /// let session = Session::connect("http://localhost:5001")?;
    /// let url = session.share("docs/report.pdf").await?;
    /// println!("Share link: {}", url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn share(&self, key: &str) -> Result<String> {
        let url = self.api.share(key).await?;
        info!(key, "share link created");
        Ok(url)
    }
}
