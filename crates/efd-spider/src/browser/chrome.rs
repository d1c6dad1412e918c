use super::{Driver, WindowHandle};
use crate::error::{Result, ScrapeError};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use tracing::trace;

/// [`Driver`] over a local Chrome, one tab per window.
pub struct ChromeDriver {
    browser: Browser,
    tabs: Vec<Arc<Tab>>,
    current: WindowHandle,
}

impl ChromeDriver {
    pub fn launch(headless: bool) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .build()
            .map_err(driver_err)?;
        let browser = Browser::new(options).map_err(driver_err)?;
        let tab = browser.new_tab().map_err(driver_err)?;
        let current = tab.get_target_id().clone();
        trace!("chrome launched, first window {current}");

        Ok(Self {
            browser,
            tabs: vec![tab],
            current,
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>> {
        self.tabs
            .iter()
            .find(|tab| *tab.get_target_id() == self.current)
            .ok_or_else(|| ScrapeError::Driver(format!("no open window {}", self.current)))
    }

    fn evaluate(&self, js: &str) -> Result<Option<serde_json::Value>> {
        let object = self.tab()?.evaluate(js, false).map_err(driver_err)?;
        Ok(object.value)
    }
}

impl Driver for ChromeDriver {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(driver_err)?
            .wait_until_navigated()
            .map_err(driver_err)?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    fn wait_for_element(&mut self, selector: &str) -> Result<()> {
        self.tab()?
            .wait_for_element(selector)
            .map_err(|err| element_err(selector, err))?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.tab()?
            .find_element(selector)
            .map_err(|err| element_err(selector, err))?
            .click()
            .map_err(|err| element_err(selector, err))?;
        Ok(())
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        self.tab()?
            .find_element(selector)
            .map_err(|err| element_err(selector, err))?
            .click()
            .map_err(|err| element_err(selector, err))?
            .type_into(text)
            .map_err(|err| element_err(selector, err))?;
        Ok(())
    }

    fn select(&mut self, selector: &str, value: &str) -> Result<()> {
        // DataTables listens for `change` on its length menu
        let js = format!(
            "(() => {{
                const el = document.querySelector({selector});
                el.value = {value};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }})()",
            selector = serde_json::to_string(selector)?,
            value = serde_json::to_string(value)?,
        );
        self.evaluate(&js)?;
        Ok(())
    }

    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>> {
        self.tab()?
            .find_element(selector)
            .map_err(|err| element_err(selector, err))?
            .get_attribute_value(name)
            .map_err(|err| element_err(selector, err))
    }

    fn read_table(&mut self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            "(() => {{
                const el = document.querySelector({selector});
                return el ? el.outerHTML : null;
            }})()",
            selector = serde_json::to_string(selector)?,
        );
        match self.evaluate(&js)? {
            Some(serde_json::Value::String(html)) => Ok(Some(html)),
            _ => Ok(None),
        }
    }

    fn current_window(&self) -> WindowHandle {
        self.current.clone()
    }

    fn open_window(&mut self, url: &str) -> Result<WindowHandle> {
        let tab = self.browser.new_tab().map_err(driver_err)?;
        tab.navigate_to(url)
            .map_err(driver_err)?
            .wait_until_navigated()
            .map_err(driver_err)?;

        let handle = tab.get_target_id().clone();
        self.tabs.push(tab);
        self.current = handle.clone();
        Ok(handle)
    }

    fn switch_to(&mut self, window: &WindowHandle) -> Result<()> {
        let tab = self
            .tabs
            .iter()
            .find(|tab| tab.get_target_id() == window)
            .ok_or_else(|| ScrapeError::Driver(format!("no open window {window}")))?;
        tab.activate().map_err(driver_err)?;
        self.current = window.clone();
        Ok(())
    }

    fn close_window(&mut self) -> Result<()> {
        let position = self
            .tabs
            .iter()
            .position(|tab| *tab.get_target_id() == self.current)
            .ok_or_else(|| ScrapeError::Driver(format!("no open window {}", self.current)))?;
        let tab = self.tabs.remove(position);
        tab.close(true).map_err(driver_err)?;
        self.current = WindowHandle::new();
        Ok(())
    }
}

fn driver_err(err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Driver(err.to_string())
}

/// Chrome reports a re-rendered node as an unknown node id.
fn element_err(selector: &str, err: impl std::fmt::Display) -> ScrapeError {
    let message = err.to_string();
    if message.contains("node with given id") {
        ScrapeError::StaleElement(selector.to_string())
    } else {
        ScrapeError::Driver(format!("{selector}: {message}"))
    }
}
