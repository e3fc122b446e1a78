use super::{ClientSettings, Error};

/// Build a reqwest client for the Azure ML client
///
/// # Arguments
///
/// * `settings` - The settings for building a client
pub(super) fn build_reqwest_client(settings: &ClientSettings) -> Result<reqwest::Client, Error> {
    // start building our client
    let builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(settings.invalid_certs)
        .danger_accept_invalid_hostnames(settings.invalid_hostnames)
        .timeout(std::time::Duration::from_secs(settings.timeout));
    // build our client
    Ok(builder.build()?)
}

/// Send a request and if its successful cast the response to a target type
#[doc(hidden)]
#[macro_export]
macro_rules! send_build {
    ($client:expr, $req:expr, $build:ty) => {
        // attempt to send request
        match $client.execute($req.build()?).await {
            // response was received
            Ok(resp) => {
                // check if a response has an error status or not
                if resp.status().is_success() {
                    // attempt to build this response or return an error
                    match resp.json::<$build>().await {
                        // successfully built object
                        Ok(val) => Ok(val),
                        // failed to build object create error
                        Err(e) => Err(Error::from(e)),
                    }
                } else {
                    // the response had an error status
                    Err(Error::from_response(resp).await)
                }
            }
            Err(e) => Err(Error::from(e)),
        }
    };
}
