use crate::config::Config;
use crate::errors::Error;

use kube::Resource as KubeResource;
use kube::ResourceExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

/*
 * The tail end of every create command: a dry run renders the resource as
 * a YAML document, otherwise it is created and the server's copy, with
 * its uid and creation timestamp, is handed back. API errors are returned
 * untouched.
 */
pub async fn create_or_render<K>(c: &Config, noun: &str, resource: K, dry_run: bool) -> Result<K, Error>
where
    K: KubeResource<DynamicType = ()> + Serialize + DeserializeOwned,
{
    let resource = match dry_run {
	true => {
	    c.output.document(&resource)?;
	    resource
	},
	false => {
	    let namespace = resource.namespace().unwrap_or_default();
	    c.resources::<K>().create(&namespace, &resource).await?
	},
    };

    c.output.success(format!("Created {} {:?}", noun, resource.name_any()));
    Ok(resource)
}
